//! Marching Cubes triangulation.
//!
//! This module provides the per-cell marching cubes algorithm used to turn a
//! sampled lattice into triangles. It includes:
//!
//! - Compile-time lookup tables for cube configurations
//! - Functions for processing individual cells
//! - Both allocating and no-alloc variants for flexibility
//!
//! # Example
//!
//! ```
//! use isomesh_core::marching_cubes::{process_cell_no_alloc, LatticeView, VertexPlacement};
//! use isomesh_core::{LatticeCoord, LatticeDims, LatticeGeometry, Point3, SphereDensity};
//!
//! let dims = LatticeDims::new(3).unwrap();
//! let geom = LatticeGeometry::new(dims, 2.0, Point3::ZERO).unwrap();
//! let sphere = SphereDensity::new(Point3::ZERO, 0.5);
//! let samples: Vec<_> = (0..dims.num_points())
//!     .map(|i| geom.sample(&sphere, dims.coord(i)))
//!     .collect();
//!
//! let view = LatticeView::new(dims, &samples).unwrap();
//! let (_triangles, count) =
//!     process_cell_no_alloc(&view, LatticeCoord::new(0, 0, 0), 0.0, VertexPlacement::Midpoint);
//! assert!(count > 0);
//! ```

mod algorithm;
mod tables;

pub use algorithm::{
    compute_cube_index, edge_vertex, interpolate_vertex, process_cell_no_alloc, LatticeView,
    VertexPlacement,
};
pub use tables::{CORNER_OFFSETS, EDGE_TABLE, EDGE_VERTICES, TRI_TABLE};

#[cfg(any(feature = "std", feature = "alloc"))]
pub use algorithm::process_cell;
