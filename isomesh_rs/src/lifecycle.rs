//! Per-regeneration resource state machine.
//!
//! ```text
//! Idle -> Allocated -> SampleDispatched -> TriangulateDispatched -> ReadBack -> Released -> Idle
//! ```
//!
//! Every regeneration walks the states in order. Any exit path, including an
//! error, returns the machine to `Idle` once the transient buffers are gone.

use crate::error::{IsoError, Result};

/// Stage of a regeneration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// No regeneration in flight and no transient buffers alive.
    #[default]
    Idle,
    /// Lattice, triangle and count buffers allocated.
    Allocated,
    /// Lattice sampling completed.
    SampleDispatched,
    /// Triangulation completed.
    TriangulateDispatched,
    /// Count and triangles read back to the CPU.
    ReadBack,
    /// Transient buffers released.
    Released,
}

impl LifecycleState {
    /// The state that follows `self`.
    pub const fn next(self) -> Self {
        match self {
            LifecycleState::Idle => LifecycleState::Allocated,
            LifecycleState::Allocated => LifecycleState::SampleDispatched,
            LifecycleState::SampleDispatched => LifecycleState::TriangulateDispatched,
            LifecycleState::TriangulateDispatched => LifecycleState::ReadBack,
            LifecycleState::ReadBack => LifecycleState::Released,
            LifecycleState::Released => LifecycleState::Idle,
        }
    }
}

/// Tracks the current stage and rejects out-of-order steps.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    /// A machine in the `Idle` state.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
        }
    }

    /// Current stage.
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Move to `to`, which must directly follow the current state.
    ///
    /// On failure the error carries the current state and `to`, and the
    /// machine stays where it was.
    pub fn advance(&mut self, to: LifecycleState) -> Result<()> {
        if to != self.state.next() {
            return Err(IsoError::Lifecycle {
                state: self.state,
                requested: to,
            });
        }
        log::trace!("lifecycle {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Return to `Idle` from any state.
    pub fn reset(&mut self) {
        if self.state != LifecycleState::Idle {
            log::trace!("lifecycle {:?} -> Idle", self.state);
        }
        self.state = LifecycleState::Idle;
    }
}
