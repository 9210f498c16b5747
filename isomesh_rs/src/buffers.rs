//! Transient buffers feeding and draining the parallel dispatches.
//!
//! Three buffers live for exactly one regeneration:
//!
//! - [`LatticeBuffer`]: one `(position, density)` record per lattice point
//! - [`AppendBuffer`]: pre-sized triangle slots filled through an atomic counter
//! - [`CountBuffer`]: the counter value copied out after triangulation
//!
//! Allocations are accounted in a shared [`ResourceTracker`] through
//! [`BufferLease`]s, which release on drop so every exit path gives the
//! buffers back.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use isomesh_core::{IsoCoreError, LatticeDims, LatticeSample, LatticeView, Triangle};

use crate::error::{IsoError, Result};

/// Number of buffers making up one regeneration's transient set.
pub const BUFFERS_PER_REGENERATION: usize = 3;

/// Counts live transient buffers.
///
/// Shared between a generator and the leases it hands out, so leaks are
/// observable after the fact.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    live: AtomicUsize,
    allocated: AtomicUsize,
    released: AtomicUsize,
}

impl ResourceTracker {
    /// A tracker with nothing outstanding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers currently allocated and not yet released.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Buffers allocated over the tracker's lifetime.
    #[inline]
    pub fn total_allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Buffers released over the tracker's lifetime.
    #[inline]
    pub fn total_released(&self) -> usize {
        self.released.load(Ordering::Acquire)
    }

    fn acquire(&self, buffers: usize) {
        self.live.fetch_add(buffers, Ordering::AcqRel);
        self.allocated.fetch_add(buffers, Ordering::AcqRel);
    }

    fn release(&self, buffers: usize) {
        self.live.fetch_sub(buffers, Ordering::AcqRel);
        self.released.fetch_add(buffers, Ordering::AcqRel);
    }
}

/// Accounting token for a group of buffers.
///
/// Registers the buffers with the tracker on creation and releases them when
/// dropped.
#[derive(Debug)]
pub struct BufferLease {
    tracker: Arc<ResourceTracker>,
    buffers: usize,
}

impl BufferLease {
    /// Register `buffers` allocations with `tracker`.
    pub fn acquire(tracker: &Arc<ResourceTracker>, buffers: usize) -> Self {
        tracker.acquire(buffers);
        Self {
            tracker: Arc::clone(tracker),
            buffers,
        }
    }

    /// Number of buffers covered.
    #[inline]
    pub fn buffers(&self) -> usize {
        self.buffers
    }
}

impl Drop for BufferLease {
    fn drop(&mut self) {
        self.tracker.release(self.buffers);
    }
}

/// Flat lattice storage, `N³` records indexed by `x + y·N + z·N²`.
#[derive(Debug, Clone)]
pub struct LatticeBuffer {
    dims: LatticeDims,
    samples: Vec<LatticeSample>,
}

impl LatticeBuffer {
    /// Allocate storage for every point of `dims`.
    pub fn allocate(dims: LatticeDims) -> Self {
        Self {
            dims,
            samples: vec![LatticeSample::default(); dims.num_points()],
        }
    }

    /// Lattice resolution.
    #[inline]
    pub fn dims(&self) -> LatticeDims {
        self.dims
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True for a zero-sized buffer (never the case for a valid lattice).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Records in flat index order.
    #[inline]
    pub fn samples(&self) -> &[LatticeSample] {
        &self.samples
    }

    /// Mutable records, for the sampling dispatch.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [LatticeSample] {
        &mut self.samples
    }

    /// Read-only view for the triangulator.
    pub fn view(&self) -> core::result::Result<LatticeView<'_>, IsoCoreError> {
        LatticeView::new(self.dims, &self.samples)
    }

    /// Copy the records out.
    pub fn read_back(&self) -> Vec<LatticeSample> {
        self.samples.clone()
    }
}

/// Single-value buffer receiving an append counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountBuffer {
    value: usize,
}

impl CountBuffer {
    /// A zeroed count buffer.
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// The stored count.
    #[inline]
    pub const fn get(&self) -> usize {
        self.value
    }
}

/// Fixed-capacity, append-only output collection.
///
/// Concurrent writers claim a slot with an atomic fetch-add on the counter
/// and write their value into it, so no two appends share a slot. Slots past
/// the counter are never initialized. The counter keeps counting past the
/// capacity so an overflow is visible at read-back instead of being
/// truncated away.
pub struct AppendBuffer<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    counter: AtomicUsize,
}

// SAFETY: each slot index is handed out once per counter reset by `fetch_add`,
// so concurrent `append` calls never touch the same slot. Reads need `&mut self`,
// which excludes concurrent appends.
unsafe impl<T: Send> Sync for AppendBuffer<T> {}

impl<T: Copy> AppendBuffer<T> {
    /// Allocate `capacity` uninitialized slots with the counter at zero.
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Self {
            slots,
            counter: AtomicUsize::new(0),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Raw counter value. May exceed the capacity after an overflow.
    #[inline]
    pub fn counter(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }

    /// Overwrite the counter, normally with zero before a dispatch.
    #[inline]
    pub fn set_counter_value(&mut self, value: usize) {
        *self.counter.get_mut() = value;
    }

    /// Append `value`, returning `false` if the buffer is already full.
    ///
    /// A rejected append still advances the counter.
    #[inline]
    pub fn append(&self, value: T) -> bool {
        let slot = self.counter.fetch_add(1, Ordering::AcqRel);
        match self.slots.get(slot) {
            Some(cell) => {
                // SAFETY: `slot` was claimed exclusively by the fetch_add above.
                unsafe { (*cell.get()).write(value) };
                true
            }
            None => false,
        }
    }

    /// Copy the counter into `dst`.
    #[inline]
    pub fn copy_count_to(&self, dst: &mut CountBuffer) {
        dst.value = self.counter();
    }

    /// Read the first `count` records.
    ///
    /// # Errors
    /// Returns `TriangleOverflow` when `count` exceeds the capacity, or when it
    /// exceeds the number of slots claimed since the last counter reset.
    pub fn read(&mut self, count: usize) -> Result<Vec<T>> {
        let claimed = *self.counter.get_mut();
        if count > self.slots.len() || count > claimed {
            return Err(IsoError::TriangleOverflow {
                count: count.max(claimed),
                capacity: self.slots.len(),
            });
        }
        Ok(self.slots[..count]
            .iter_mut()
            // SAFETY: slots below the counter were written by `append`, and
            // `&mut self` guarantees every append has completed.
            .map(|cell| unsafe { cell.get_mut().assume_init_read() })
            .collect())
    }
}

impl<T> core::fmt::Debug for AppendBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppendBuffer")
            .field("capacity", &self.slots.len())
            .field("counter", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}

/// The three buffers of one regeneration, allocated and released together.
#[derive(Debug)]
pub struct TransientBuffers {
    /// Sampled lattice.
    pub lattice: LatticeBuffer,
    /// Triangulator output.
    pub triangles: AppendBuffer<Triangle>,
    /// Triangle count read back after triangulation.
    pub count: CountBuffer,
    lease: BufferLease,
}

impl TransientBuffers {
    /// Allocate buffers for `dims`: `N³` lattice records, `(N-1)³ × 5` triangle
    /// slots and one count.
    pub fn allocate(dims: LatticeDims, tracker: &Arc<ResourceTracker>) -> Self {
        let lease = BufferLease::acquire(tracker, BUFFERS_PER_REGENERATION);
        log::debug!(
            "allocating transient buffers: {} lattice points, {} triangle slots",
            dims.num_points(),
            dims.max_triangles()
        );
        Self {
            lattice: LatticeBuffer::allocate(dims),
            triangles: AppendBuffer::with_capacity(dims.max_triangles()),
            count: CountBuffer::new(),
            lease,
        }
    }

    /// Number of buffers held.
    #[inline]
    pub fn buffers(&self) -> usize {
        self.lease.buffers()
    }

    /// Release all three buffers.
    pub fn release(self) {
        log::debug!("releasing {} transient buffers", self.lease.buffers());
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::Point3;

    #[test]
    fn test_append_and_read() {
        let mut buffer = AppendBuffer::<u32>::with_capacity(4);
        assert!(buffer.append(7));
        assert!(buffer.append(9));

        let mut count = CountBuffer::new();
        buffer.copy_count_to(&mut count);
        assert_eq!(count.get(), 2);

        let values = buffer.read(count.get()).unwrap();
        assert_eq!(values, vec![7, 9]);
    }

    #[test]
    fn test_overflow_is_reported_not_truncated() {
        let mut buffer = AppendBuffer::<u32>::with_capacity(2);
        assert!(buffer.append(1));
        assert!(buffer.append(2));
        assert!(!buffer.append(3));
        assert_eq!(buffer.counter(), 3);

        let err = buffer.read(3).unwrap_err();
        assert!(matches!(
            err,
            IsoError::TriangleOverflow {
                count: 3,
                capacity: 2
            }
        ));
    }

    #[test]
    fn test_read_past_claimed_slots_rejected() {
        let mut buffer = AppendBuffer::<u32>::with_capacity(8);
        buffer.append(1);
        assert!(buffer.read(2).is_err());
    }

    #[test]
    fn test_counter_reset() {
        let mut buffer = AppendBuffer::<u32>::with_capacity(4);
        buffer.append(1);
        buffer.append(2);
        buffer.set_counter_value(0);
        assert_eq!(buffer.counter(), 0);

        buffer.append(5);
        assert_eq!(buffer.read(1).unwrap(), vec![5]);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        use rayon::prelude::*;

        let mut buffer = AppendBuffer::<u32>::with_capacity(10_000);
        (0..10_000u32).into_par_iter().for_each(|i| {
            assert!(buffer.append(i));
        });

        let mut values = buffer.read(10_000).unwrap();
        values.sort_unstable();
        assert!(values.iter().copied().eq(0..10_000u32));
    }

    #[test]
    fn test_transient_buffer_sizes() {
        let tracker = Arc::new(ResourceTracker::new());
        let dims = LatticeDims::new(10).unwrap();

        let buffers = TransientBuffers::allocate(dims, &tracker);
        assert_eq!(buffers.lattice.len(), 1000);
        assert_eq!(buffers.triangles.capacity(), 729 * 5);
        assert_eq!(buffers.count.get(), 0);
        assert_eq!(tracker.outstanding(), BUFFERS_PER_REGENERATION);

        buffers.release();
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.total_allocated(), 3);
        assert_eq!(tracker.total_released(), 3);
    }

    #[test]
    fn test_lease_released_on_drop() {
        let tracker = Arc::new(ResourceTracker::new());
        {
            let _lease = BufferLease::acquire(&tracker, 1);
            assert_eq!(tracker.outstanding(), 1);
        }
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_lattice_view() {
        let dims = LatticeDims::new(3).unwrap();
        let mut lattice = LatticeBuffer::allocate(dims);
        lattice.samples_mut()[0] = LatticeSample::new(Point3::splat(1.0), -2.0);

        let view = lattice.view().unwrap();
        assert_eq!(view.samples()[0].density, -2.0);
        assert_eq!(lattice.read_back().len(), 27);
    }
}
