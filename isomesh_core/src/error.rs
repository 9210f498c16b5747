//! Error types for isomesh_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Error types that can occur during isomesh_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsoCoreError {
    /// The lattice has fewer than two points per axis, so it contains no cell.
    DegenerateLattice {
        /// The rejected number of points per axis.
        points_per_axis: u32,
    },
    /// The bounding box yields a spacing that is not a positive finite number.
    InvalidSpacing {
        /// The rejected bounds size.
        bounds_size: f32,
    },
    /// The sample slice does not hold exactly one record per lattice point.
    LatticeSizeMismatch {
        /// N³ for the lattice dimensions.
        expected: usize,
        /// Number of records provided.
        got: usize,
    },
    /// A cell coordinate lies outside the lattice.
    CellOutOfBounds {
        /// The coordinate component that was out of bounds.
        coord: u32,
        /// The maximum valid value (cells_per_axis - 1).
        max: u32,
    },
}

impl fmt::Display for IsoCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsoCoreError::DegenerateLattice { points_per_axis } => {
                write!(
                    f,
                    "lattice needs at least 2 points per axis, got {}",
                    points_per_axis
                )
            }
            IsoCoreError::InvalidSpacing { bounds_size } => {
                write!(
                    f,
                    "bounds size {} does not give a positive lattice spacing",
                    bounds_size
                )
            }
            IsoCoreError::LatticeSizeMismatch { expected, got } => {
                write!(
                    f,
                    "lattice size mismatch: expected {} samples, got {}",
                    expected, got
                )
            }
            IsoCoreError::CellOutOfBounds { coord, max } => {
                write!(f, "cell coordinate {} exceeds maximum {}", coord, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IsoCoreError {}
