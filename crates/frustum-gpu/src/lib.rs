//! # frustum-gpu
//!
//! Device compute abstraction layer for the frustum renderer.
//!
//! Provides a [`DeviceBackend`] trait describing the accelerator contract
//! (allocation, transfers, GEMM, fused scale-add, perspective divide) and
//! a [`CpuBackend`] that implements it in host memory.
//!
//! On top of the backend sit the ownership pieces the matrix types use:
//! - [`DeviceBuffer`]: move-only handle to one device allocation
//! - [`BufferPool`]: recycles same-size allocations instead of freeing them
//! - [`DeviceContext`]: backend + pool, passed explicitly to every matrix

pub mod backend;
pub mod buffers;
pub mod context;
pub mod pool;

pub use backend::{BackendStats, CpuBackend, DeviceBackend, GemmShape, Operand, Output};
pub use buffers::{DeviceBuffer, DevicePtr};
pub use context::{DeviceContext, PooledBuffer};
pub use pool::{BufferPool, PoolStats};
