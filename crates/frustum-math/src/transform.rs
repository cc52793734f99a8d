//! Homogeneous 4×4 transforms.
//!
//! Points are row vectors `(x, y, z, w)` multiplied on the left,
//! `p' = p · M`, so translation lives in the bottom row and transforms
//! compose left to right: `p · A · B` applies `A` first.
//!
//! The free functions return plain values; [`Transform`] uploads them
//! into fresh [`FixedMatrix`] instances.

use frustum_gpu::DeviceContext;
use frustum_types::{FrustumResult, Scalar};

use crate::fixed::FixedMatrix;

/// Row-major 4×4 values.
pub type Mat4Values = [[Scalar; 4]; 4];

pub fn identity() -> Mat4Values {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn translation(dx: Scalar, dy: Scalar, dz: Scalar) -> Mat4Values {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [dx, dy, dz, 1.0],
    ]
}

pub fn rotation_x(angle: Scalar) -> Mat4Values {
    let (s, c) = angle.sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn rotation_y(angle: Scalar) -> Mat4Values {
    let (s, c) = angle.sin_cos();
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn rotation_z(angle: Scalar) -> Mat4Values {
    let (s, c) = angle.sin_cos();
    [
        [c, s, 0.0, 0.0],
        [-s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Uniform scale of x, y and z.
pub fn scaling(factor: Scalar) -> Mat4Values {
    [
        [factor, 0.0, 0.0, 0.0],
        [0.0, factor, 0.0, 0.0],
        [0.0, 0.0, factor, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Symmetric-frustum perspective projection.
///
/// `h_fov` and `v_fov` are full field-of-view angles in radians. The
/// frustum half-extents at unit distance are their half-angle tangents.
/// Camera-space `z` is copied into `w` for the perspective divide.
pub fn perspective(near: Scalar, far: Scalar, h_fov: Scalar, v_fov: Scalar) -> Mat4Values {
    let right = (h_fov / 2.0).tan();
    let left = -right;
    let top = (v_fov / 2.0).tan();
    let bottom = -top;

    let m00 = 2.0 / (right - left);
    let m11 = 2.0 / (top - bottom);
    let m22 = (far + near) / (far - near);
    let m32 = -2.0 * far * near / (far - near);
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, 1.0],
        [0.0, 0.0, m32, 0.0],
    ]
}

/// Maps clip space `[-1, 1]²` onto a `2·half_width × 2·half_height`
/// pixel grid with y pointing down.
pub fn screen_mapping(half_width: Scalar, half_height: Scalar) -> Mat4Values {
    [
        [half_width, 0.0, 0.0, 0.0],
        [0.0, -half_height, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [half_width, half_height, 0.0, 1.0],
    ]
}

/// Device-side construction of the standard transforms.
///
/// Every call returns a new matrix; nothing is cached.
pub struct Transform;

impl Transform {
    pub fn identity(ctx: &DeviceContext) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, identity())
    }

    pub fn translate(ctx: &DeviceContext, dx: Scalar, dy: Scalar, dz: Scalar) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, translation(dx, dy, dz))
    }

    pub fn rotate_x(ctx: &DeviceContext, angle: Scalar) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, rotation_x(angle))
    }

    pub fn rotate_y(ctx: &DeviceContext, angle: Scalar) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, rotation_y(angle))
    }

    pub fn rotate_z(ctx: &DeviceContext, angle: Scalar) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, rotation_z(angle))
    }

    pub fn scale(ctx: &DeviceContext, factor: Scalar) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, scaling(factor))
    }

    pub fn perspective_projection(
        ctx: &DeviceContext,
        near: Scalar,
        far: Scalar,
        h_fov: Scalar,
        v_fov: Scalar,
    ) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, perspective(near, far, h_fov, v_fov))
    }

    pub fn screen_mapping(
        ctx: &DeviceContext,
        half_width: Scalar,
        half_height: Scalar,
    ) -> FrustumResult<FixedMatrix<4, 4>> {
        FixedMatrix::new(ctx, screen_mapping(half_width, half_height))
    }
}
