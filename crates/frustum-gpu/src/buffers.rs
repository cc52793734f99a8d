//! Device buffer handles.
//!
//! A [`DevicePtr`] is the raw, copyable address a backend understands.
//! A [`DeviceBuffer`] is the owning handle: it cannot be cloned, so at
//! most one matrix owns a given allocation at any time.

use frustum_types::BufferId;

/// Raw address of a device allocation: backend id plus element capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevicePtr {
    id: BufferId,
    len: usize,
}

impl DevicePtr {
    /// Creates a pointer. Only backends should mint these.
    pub fn new(id: BufferId, len: usize) -> Self {
        Self { id, len }
    }

    /// Backend-issued identifier.
    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Capacity in scalar elements (not bytes).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true for a zero-capacity allocation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Exclusive ownership of one device allocation.
///
/// Produced by [`BufferPool::acquire`](crate::BufferPool::acquire) and
/// consumed by [`BufferPool::release`](crate::BufferPool::release).
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceBuffer {
    ptr: DevicePtr,
}

impl DeviceBuffer {
    pub(crate) fn new(ptr: DevicePtr) -> Self {
        Self { ptr }
    }

    /// The raw device address, for passing to backend calls.
    #[inline]
    pub fn ptr(&self) -> DevicePtr {
        self.ptr
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.ptr.id()
    }

    /// Capacity in scalar elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ptr.len()
    }

    pub(crate) fn into_ptr(self) -> DevicePtr {
        self.ptr
    }
}
