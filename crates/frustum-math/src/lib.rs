//! # frustum-math
//!
//! Device-resident matrices for the frustum renderer.
//!
//! Provides:
//! - [`FixedMatrix`]: compile-time-sized matrix with a lazy host mirror
//! - [`DynamicMatrix`]: row-growable matrix for vertex sets
//! - [`ProjectionBuffer`]: ping-pong buffer for the per-frame pipeline
//! - [`Transform`]: standard 4×4 homogeneous transforms
//!
//! All storage comes from a [`frustum_gpu::DeviceContext`] passed in by
//! the caller.

pub mod dynamic;
pub mod fixed;
pub mod format;
pub mod projection;
pub mod transform;

pub use dynamic::DynamicMatrix;
pub use fixed::FixedMatrix;
pub use projection::{ProjectionBuffer, ProjectionStage};
pub use transform::{Mat4Values, Transform};

// Re-export the glam types the conversions produce.
pub use glam::{DMat4, DVec4};
