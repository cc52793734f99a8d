//! Perspective and screen-mapping transforms for one output size.

use frustum_gpu::DeviceContext;
use frustum_math::{FixedMatrix, Transform};
use frustum_types::constants::EPSILON;
use frustum_types::{FrustumResult, Scalar};

use crate::config::RendererConfig;

/// The two fixed transforms of the frame pipeline.
///
/// Built once per configuration and reused every frame.
#[derive(Debug)]
pub struct Projection {
    projection_matrix: FixedMatrix<4, 4>,
    screen_matrix: FixedMatrix<4, 4>,
    half_width: Scalar,
    half_height: Scalar,
}

impl Projection {
    pub fn new(ctx: &DeviceContext, config: &RendererConfig) -> FrustumResult<Self> {
        config.validate()?;
        let (half_width, half_height) = (config.half_width(), config.half_height());
        Ok(Self {
            projection_matrix: Transform::perspective_projection(
                ctx,
                config.near_plane,
                config.far_plane,
                config.h_fov,
                config.v_fov(),
            )?,
            screen_matrix: Transform::screen_mapping(ctx, half_width, half_height)?,
            half_width,
            half_height,
        })
    }

    #[inline]
    pub fn projection_matrix(&self) -> &FixedMatrix<4, 4> {
        &self.projection_matrix
    }

    #[inline]
    pub fn screen_matrix(&self) -> &FixedMatrix<4, 4> {
        &self.screen_matrix
    }

    /// Screen x of a clipped vertex.
    #[inline]
    pub fn half_width(&self) -> Scalar {
        self.half_width
    }

    /// Screen y of a clipped vertex.
    #[inline]
    pub fn half_height(&self) -> Scalar {
        self.half_height
    }

    /// Whether a screen-space point is the image of a clipped vertex.
    #[inline]
    pub fn is_clipped(&self, x: Scalar, y: Scalar) -> bool {
        (x - self.half_width).abs() < EPSILON || (y - self.half_height).abs() < EPSILON
    }
}
