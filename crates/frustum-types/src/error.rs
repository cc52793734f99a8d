//! Error types for the frustum renderer.
//!
//! All crates return `FrustumResult<T>` from fallible operations.
//! A vertex that projects outside the clip volume is not an error; it is
//! carried through the pipeline as ordinary (sentinel) data.

use thiserror::Error;

/// Unified error type for the frustum renderer.
#[derive(Debug, Error)]
pub enum FrustumError {
    /// The device backend could not satisfy an allocation.
    ///
    /// Treated as unrecoverable for the current frame.
    #[error("Out of device memory: requested {requested} elements, {available} available")]
    OutOfDeviceMemory {
        requested: usize,
        available: usize,
    },

    /// Operand dimensions disagree (multiply inner dimension, row width, element count).
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Element access outside the matrix.
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A device handle that the backend does not know about.
    #[error("Invalid device handle: {0}")]
    InvalidHandle(u64),

    /// Any other device backend failure.
    #[error("Device error: {0}")]
    Device(String),

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, FrustumError>`.
pub type FrustumResult<T> = Result<T, FrustumError>;
