//! Device context: one backend plus its buffer pool.
//!
//! The context is passed explicitly to every matrix constructor. Each
//! context owns exactly one pool.
//!
//! Execution is single-threaded and synchronous: the context is an
//! `Rc`, and the backend and pool sit behind `RefCell`s that are only
//! borrowed for the duration of one backend call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use frustum_types::{BufferId, FrustumResult};

use crate::backend::{BackendStats, CpuBackend, DeviceBackend};
use crate::buffers::{DeviceBuffer, DevicePtr};
use crate::pool::{BufferPool, PoolStats};

struct ContextInner {
    backend: RefCell<Box<dyn DeviceBackend>>,
    pool: RefCell<BufferPool>,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        let backend = self.backend.get_mut();
        if let Err(err) = self.pool.get_mut().teardown(backend.as_mut()) {
            tracing::warn!(error = %err, "buffer pool teardown failed");
        }
    }
}

/// Shared handle to a backend and its pool.
///
/// Cloning is cheap and yields a handle to the same device. The pool is
/// torn down once the last handle and the last pooled buffer are gone.
#[derive(Clone)]
pub struct DeviceContext {
    inner: Rc<ContextInner>,
}

impl DeviceContext {
    /// Wraps a backend with a fresh, empty pool.
    pub fn new(backend: impl DeviceBackend + 'static) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                backend: RefCell::new(Box::new(backend)),
                pool: RefCell::new(BufferPool::new()),
            }),
        }
    }

    /// Context over an unbounded [`CpuBackend`].
    pub fn cpu() -> Self {
        Self::new(CpuBackend::new())
    }

    /// Acquires a pooled buffer of exactly `len` elements.
    pub fn acquire(&self, len: usize) -> FrustumResult<PooledBuffer> {
        let mut backend = self.inner.backend.borrow_mut();
        let buffer = self.inner.pool.borrow_mut().acquire(backend.as_mut(), len)?;
        drop(backend);
        Ok(PooledBuffer {
            ptr: buffer.ptr(),
            buffer: Some(buffer),
            ctx: self.clone(),
        })
    }

    /// Runs one backend call.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn DeviceBackend) -> R) -> R {
        let mut backend = self.inner.backend.borrow_mut();
        f(backend.as_mut())
    }

    /// Returns true if both handles refer to the same device.
    pub fn same_device(&self, other: &DeviceContext) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.inner.pool.borrow().stats()
    }

    pub fn backend_stats(&self) -> BackendStats {
        self.inner.backend.borrow().stats()
    }

    pub fn backend_name(&self) -> String {
        self.inner.backend.borrow().name().to_string()
    }

    fn release(&self, buffer: DeviceBuffer) {
        self.inner.pool.borrow_mut().release(buffer);
    }
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("backend", &self.backend_name())
            .field("pool", &self.pool_stats())
            .finish()
    }
}

/// A [`DeviceBuffer`] that returns itself to its pool when dropped.
///
/// This is the scoped form of acquire/release: the buffer goes back on
/// every exit path, including early returns on error.
pub struct PooledBuffer {
    ptr: DevicePtr,
    buffer: Option<DeviceBuffer>,
    ctx: DeviceContext,
}

impl PooledBuffer {
    /// Raw address for backend calls.
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

    /// The context this buffer was drawn from.
    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }
}

impl fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("id", &self.ptr.id())
            .field("capacity", &self.ptr.len())
            .finish()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.ctx.release(buffer);
        }
    }
}
