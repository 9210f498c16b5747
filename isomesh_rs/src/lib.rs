//! # isomesh_rs
//!
//! Parallel isosurface mesh generation on top of `isomesh_core`.
//!
//! A [`SurfaceGenerator`] samples a density field on a regular cubic lattice,
//! runs marching cubes over every cell in parallel and assembles the result
//! into a renderable [`Mesh`]. Each regeneration allocates its buffers,
//! dispatches the work and releases everything before returning.
//!
//! ## Quick Start
//!
//! ```
//! use isomesh_rs::{GeneratorConfig, SurfaceGenerator};
//!
//! let config = GeneratorConfig::new(10.0, 32, 4.0).with_interpolation(true);
//! let mut generator = SurfaceGenerator::sphere(config);
//!
//! let mesh = generator.regenerate()?;
//! println!("{} triangles", mesh.triangle_count());
//! # Ok::<(), isomesh_rs::IsoError>(())
//! ```
//!
//! ## Architecture
//!
//! - **Sample dispatch**: one `(position, density)` record per lattice point,
//!   written at its flat index
//! - **Triangulate dispatch**: cells in groups of `8³`, each appending up to
//!   five triangles to a shared append buffer
//! - **Read-back**: the append counter is copied out and that many triangles
//!   are read; a count past the capacity is an error
//! - **Assembly**: unwelded vertices, identity indices, recomputed normals
//!
//! Every phase completes before the next one starts.
//!
//! ## Logging
//!
//! Uses the `log` facade. Phase details go to `debug`, the per-regeneration
//! summary to `info`, an empty mesh to `warn` and failures to `error`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffers;
pub mod collaborators;
pub mod config;
pub mod dispatch;
mod error;
mod generator;
pub mod lifecycle;
mod mesh;
pub mod movement;

pub use buffers::{
    AppendBuffer, CountBuffer, LatticeBuffer, ResourceTracker, TransientBuffers,
    BUFFERS_PER_REGENERATION,
};
pub use collaborators::{CollisionSink, MaterialId, MeshSink};
pub use config::{GeneratorConfig, MAX_POINTS_PER_AXIS, MIN_POINTS_PER_AXIS};
pub use error::{IsoError, Result};
pub use generator::SurfaceGenerator;
pub use lifecycle::LifecycleState;
pub use mesh::{Mesh, MeshStats};
pub use movement::{AxisInput, PlanarMovement};

// Re-export isomesh_core types for convenience
pub use isomesh_core::{
    DensityField, LatticeCoord, LatticeDims, LatticeGeometry, LatticeSample, Point3,
    SphereDensity, Triangle, VertexPlacement,
};

/// Prelude module for convenient imports.
///
/// ```
/// use isomesh_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::collaborators::{CollisionSink, MaterialId, MeshSink};
    pub use crate::config::GeneratorConfig;
    pub use crate::error::{IsoError, Result};
    pub use crate::generator::SurfaceGenerator;
    pub use crate::mesh::{Mesh, MeshStats};

    pub use isomesh_core::{DensityField, Point3, SphereDensity, Triangle};
}
