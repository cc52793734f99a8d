//! Renderer defaults and compute-layer constants.

use crate::scalar::Scalar;

/// Default window width in pixels.
pub const DEFAULT_WIDTH: u32 = 1024;

/// Default window height in pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

/// Default horizontal field of view (radians). 60 degrees.
pub const DEFAULT_H_FOV: Scalar = std::f64::consts::PI / 3.0;

/// Default near clipping plane distance.
pub const DEFAULT_NEAR_PLANE: Scalar = 0.1;

/// Default far clipping plane distance.
pub const DEFAULT_FAR_PLANE: Scalar = 200.0;

/// Camera translation per motion step.
pub const DEFAULT_MOVING_SPEED: Scalar = 1.5;

/// Camera rotation per motion step (radians).
pub const DEFAULT_ROTATION_SPEED: Scalar = 0.01;

/// Object self-rotation about Y per frame (radians).
pub const DEFAULT_SPIN_SPEED: Scalar = 0.005;

/// Value written into a normalized coordinate that falls outside `[-1, 1]`.
pub const CLIP_SENTINEL: Scalar = 0.0;

/// Row capacity of a growable matrix after its first growth.
pub const INITIAL_ROW_CAPACITY: usize = 2;

/// Tolerance for floating-point equality, e.g. matching the screen image
/// of the clip sentinel.
pub const EPSILON: Scalar = 1.0e-9;
