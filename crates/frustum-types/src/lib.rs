//! # frustum-types
//!
//! Shared types, identifiers, error types, and defaults
//! for the frustum mesh renderer.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other frustum crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{FrustumError, FrustumResult};
pub use ids::{BufferId, TriangleId, VertexId};
pub use scalar::Scalar;
