//! Reusable device allocations.
//!
//! Matrices of the same shape (every 4×4 transform, every 1×4 point)
//! request identically sized buffers over and over. The pool keeps
//! released buffers on a free list keyed by element count and hands
//! them back out on the next exact-size request. The backend is only
//! asked to allocate on a miss and to free at teardown.

use std::collections::HashMap;

use frustum_types::FrustumResult;

use crate::backend::DeviceBackend;
use crate::buffers::{DeviceBuffer, DevicePtr};

/// Pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions that had to allocate from the backend.
    pub allocations: u64,
    /// Acquisitions served from the free list.
    pub reuses: u64,
    /// Buffers returned to the free list.
    pub releases: u64,
    /// Buffers currently owned by a matrix.
    pub in_use: usize,
    /// Buffers currently on the free list.
    pub free_buffers: usize,
}

/// Free lists of device buffers keyed by element count.
///
/// A buffer is either on a free list (unowned) or held as a
/// [`DeviceBuffer`] by exactly one owner; the type system enforces the
/// second half because `DeviceBuffer` is move-only.
#[derive(Debug, Default)]
pub struct BufferPool {
    free: HashMap<usize, Vec<DevicePtr>>,
    stats: PoolStats,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a buffer of exactly `len` elements.
    ///
    /// Reuses a released buffer of the same size when one exists;
    /// otherwise allocates from `backend`. Allocation failure is
    /// returned as `OutOfDeviceMemory` and leaves the pool unchanged.
    pub fn acquire(&mut self, backend: &mut dyn DeviceBackend, len: usize) -> FrustumResult<DeviceBuffer> {
        if let Some(ptr) = self.free.get_mut(&len).and_then(Vec::pop) {
            self.stats.reuses += 1;
            self.stats.in_use += 1;
            self.stats.free_buffers -= 1;
            return Ok(DeviceBuffer::new(ptr));
        }

        let ptr = backend.allocate(len)?;
        tracing::debug!(len, id = ptr.id().0, backend = backend.name(), "pool miss, allocated");
        self.stats.allocations += 1;
        self.stats.in_use += 1;
        Ok(DeviceBuffer::new(ptr))
    }

    /// Puts a buffer back on the free list.
    ///
    /// Contents are left as they are and the backend is not contacted.
    pub fn release(&mut self, buffer: DeviceBuffer) {
        let ptr = buffer.into_ptr();
        self.free.entry(ptr.len()).or_default().push(ptr);
        self.stats.releases += 1;
        self.stats.in_use = self.stats.in_use.saturating_sub(1);
        self.stats.free_buffers += 1;
    }

    /// Frees every buffer on the free list.
    ///
    /// Buffers still held by owners are not touched. Every free buffer is
    /// attempted; the first failure is reported.
    pub fn teardown(&mut self, backend: &mut dyn DeviceBackend) -> FrustumResult<()> {
        let mut result = Ok(());
        for (_, ptrs) in self.free.drain() {
            for ptr in ptrs {
                if let Err(err) = backend.free(ptr) {
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        tracing::debug!(freed = self.stats.free_buffers, "buffer pool torn down");
        self.stats.free_buffers = 0;
        result
    }

    /// Number of free buffers of exactly `len` elements.
    pub fn free_count(&self, len: usize) -> usize {
        self.free.get(&len).map_or(0, Vec::len)
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}
