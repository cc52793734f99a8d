//! Scalar type alias for the compute layer.
//!
//! Vertex transforms run in double precision; screen coordinates are
//! only narrowed to `f32` at the presentation boundary.

/// The floating-point type stored in device buffers and host mirrors.
pub type Scalar = f64;
