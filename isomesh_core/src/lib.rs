//! # isomesh_core
//!
//! Pure algorithms for extracting an isosurface from a density field sampled
//! on a regular lattice.
//!
//! This crate holds the math shared by the `isomesh` runtime: it knows how to
//! evaluate a density field, how lattice points map to flat buffer indices and
//! world positions, and how a single lattice cell is triangulated with marching
//! cubes. It owns no buffers and spawns no work; scheduling lives in `isomesh_rs`.
//!
//! ## Features
//!
//! - **no_std compatible**: Works without the standard library (`alloc` optional)
//! - **Generic fields**: Any `Fn(Point3) -> f32` is a [`DensityField`]
//! - **Marching cubes**: Zero-runtime-cost lookup tables, at most five triangles per cell
//! - **Seam-exact vertices**: Neighbouring cells produce bit-identical shared vertices
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support
//! - `alloc`: Enables heap allocation (Vec, etc.) without full std
//!
//! ## Modules
//!
//! - [`types`]: Point3, LatticeCoord, LatticeSample, Triangle
//! - [`density`]: The [`DensityField`] trait and the sphere field
//! - [`lattice`]: Lattice dimensions, flat indexing and world placement
//! - [`marching_cubes`]: Per-cell triangulation
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use isomesh_core::prelude::*;
//!
//! let dims = LatticeDims::new(10).unwrap();
//! let geom = LatticeGeometry::new(dims, 10.0, Point3::ZERO).unwrap();
//! let sphere = SphereDensity::new(Point3::ZERO, 4.0);
//!
//! let sample = geom.sample(&sphere, LatticeCoord::new(0, 0, 0));
//! assert!(sample.density > 0.0);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Conditional std/alloc support
#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal alloc prelude for conditional compilation
#[cfg(feature = "std")]
mod alloc_prelude {
    pub use std::vec::Vec;
}

#[cfg(all(feature = "alloc", not(feature = "std")))]
mod alloc_prelude {
    pub use alloc::vec::Vec;
}

pub mod density;
pub mod error;
pub mod lattice;
pub mod marching_cubes;
pub mod types;

/// Prelude module for convenient imports.
///
/// Provides the most commonly used types and functions.
pub mod prelude {
    pub use crate::density::{sphere_density, DensityField, SphereDensity};
    pub use crate::error::IsoCoreError;
    pub use crate::lattice::{groups_per_axis, LatticeDims, LatticeGeometry, THREAD_GROUP_SIZE};
    pub use crate::marching_cubes::{
        interpolate_vertex, process_cell_no_alloc, LatticeView, VertexPlacement,
    };
    pub use crate::types::{
        LatticeCoord, LatticeSample, Point3, Triangle, MAX_TRIANGLES_PER_CELL,
    };

    #[cfg(any(feature = "std", feature = "alloc"))]
    pub use crate::marching_cubes::process_cell;
}

// Re-export everything at crate root for convenience
pub use density::{sphere_density, DensityField, SphereDensity};
pub use error::IsoCoreError;
pub use lattice::{groups_per_axis, LatticeDims, LatticeGeometry, THREAD_GROUP_SIZE};
pub use marching_cubes::{LatticeView, VertexPlacement};
pub use types::{LatticeCoord, LatticeSample, Point3, Triangle, MAX_TRIANGLES_PER_CELL};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_sampled_sphere_produces_triangles() {
        let dims = LatticeDims::new(6).unwrap();
        let geom = LatticeGeometry::new(dims, 4.0, Point3::ZERO).unwrap();
        let sphere = SphereDensity::new(Point3::ZERO, 1.5);

        let mut samples = [LatticeSample::default(); 216];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = geom.sample(&sphere, dims.coord(i));
        }
        let view = LatticeView::new(dims, &samples).unwrap();

        let mut total = 0;
        let cells = dims.cells_per_axis();
        for z in 0..cells {
            for y in 0..cells {
                for x in 0..cells {
                    let (_, count) = marching_cubes::process_cell_no_alloc(
                        &view,
                        LatticeCoord::new(x, y, z),
                        0.0,
                        VertexPlacement::Midpoint,
                    );
                    total += count;
                }
            }
        }

        assert!(total > 0);
        assert!(total <= dims.max_triangles());
    }

    #[test]
    fn test_field_entirely_outside_is_empty() {
        let dims = LatticeDims::new(4).unwrap();
        let geom = LatticeGeometry::new(dims, 4.0, Point3::ZERO).unwrap();
        let far = SphereDensity::new(Point3::splat(100.0), 1.0);

        let mut samples = [LatticeSample::default(); 64];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = geom.sample(&far, dims.coord(i));
        }
        let view = LatticeView::new(dims, &samples).unwrap();

        for i in 0..dims.num_cells() {
            let c = dims.cells_per_axis() as usize;
            let cell = LatticeCoord::new((i % c) as u32, ((i / c) % c) as u32, (i / (c * c)) as u32);
            let (_, count) =
                marching_cubes::process_cell_no_alloc(&view, cell, 0.0, VertexPlacement::Midpoint);
            assert_eq!(count, 0);
        }
    }
}
