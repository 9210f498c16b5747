//! Error types for isomesh_rs operations.
//!
//! Apart from `Io`, every variant is a rejected configuration or a broken
//! pipeline invariant. None of them is worth retrying unchanged.

use thiserror::Error;

use isomesh_core::IsoCoreError;

use crate::lifecycle::LifecycleState;

/// Errors that can occur while generating a mesh.
#[derive(Error, Debug)]
pub enum IsoError {
    /// Lattice or geometry rejected by the core algorithms.
    #[error("lattice error: {0}")]
    Lattice(#[from] IsoCoreError),

    /// Configuration value outside its accepted range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// No density field was attached to the generator.
    #[error("no density field attached: regeneration needs a field to sample")]
    MissingDensityField,

    /// The triangulator appended more triangles than the output buffer holds.
    #[error("triangle overflow: {count} triangles appended but capacity is {capacity}")]
    TriangleOverflow {
        /// Number of appends observed by the counter.
        count: usize,
        /// Allocated triangle capacity.
        capacity: usize,
    },

    /// A pipeline step ran out of order.
    #[error("lifecycle violation: cannot move from {state:?} to {requested:?}")]
    Lifecycle {
        /// State the generator was in.
        state: LifecycleState,
        /// State the step asked to enter.
        requested: LifecycleState,
    },

    /// I/O error while exporting a mesh.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for isomesh_rs operations.
pub type Result<T> = std::result::Result<T, IsoError>;
