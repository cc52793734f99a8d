//! First-person camera.
//!
//! The camera keeps its position and its `forward`/`up`/`right` basis
//! as device row vectors. Translation moves the position along a basis
//! vector with one fused multiply-add; yaw and pitch rotate all three
//! basis vectors together.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use frustum_gpu::DeviceContext;
use frustum_math::{FixedMatrix, Transform};
use frustum_types::{FrustumError, FrustumResult, Scalar};

use crate::config::RendererConfig;

/// One discrete camera input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraMotion {
    Left,
    Right,
    Forward,
    Backward,
    Up,
    Down,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
}

impl CameraMotion {
    pub const ALL: [CameraMotion; 10] = [
        CameraMotion::Left,
        CameraMotion::Right,
        CameraMotion::Forward,
        CameraMotion::Backward,
        CameraMotion::Up,
        CameraMotion::Down,
        CameraMotion::YawLeft,
        CameraMotion::YawRight,
        CameraMotion::PitchUp,
        CameraMotion::PitchDown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CameraMotion::Left => "left",
            CameraMotion::Right => "right",
            CameraMotion::Forward => "forward",
            CameraMotion::Backward => "backward",
            CameraMotion::Up => "up",
            CameraMotion::Down => "down",
            CameraMotion::YawLeft => "yaw-left",
            CameraMotion::YawRight => "yaw-right",
            CameraMotion::PitchUp => "pitch-up",
            CameraMotion::PitchDown => "pitch-down",
        }
    }
}

impl fmt::Display for CameraMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraMotion {
    type Err = FrustumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraMotion::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| FrustumError::InvalidConfig(format!("unknown camera motion '{s}'")))
    }
}

/// Camera position and orientation on the device.
pub struct Camera {
    position: FixedMatrix<1, 4>,
    forward: FixedMatrix<1, 4>,
    up: FixedMatrix<1, 4>,
    right: FixedMatrix<1, 4>,
    moving_speed: Scalar,
    rotation_speed: Scalar,
}

impl Camera {
    /// Creates a camera at `config.camera_position` looking down +Z.
    pub fn new(ctx: &DeviceContext, config: &RendererConfig) -> FrustumResult<Self> {
        let [x, y, z] = config.camera_position;
        Ok(Self {
            position: FixedMatrix::new(ctx, [[x, y, z, 1.0]])?,
            forward: FixedMatrix::new(ctx, [[0.0, 0.0, 1.0, 1.0]])?,
            up: FixedMatrix::new(ctx, [[0.0, 1.0, 0.0, 1.0]])?,
            right: FixedMatrix::new(ctx, [[1.0, 0.0, 0.0, 1.0]])?,
            moving_speed: config.moving_speed,
            rotation_speed: config.rotation_speed,
        })
    }

    /// Applies one motion step.
    pub fn apply(&mut self, motion: CameraMotion) -> FrustumResult<()> {
        let speed = self.moving_speed;
        match motion {
            CameraMotion::Left => self.position.multiply_sub(&self.right, speed),
            CameraMotion::Right => self.position.multiply_add(&self.right, speed),
            CameraMotion::Forward => self.position.multiply_add(&self.forward, speed),
            CameraMotion::Backward => self.position.multiply_sub(&self.forward, speed),
            CameraMotion::Up => self.position.multiply_add(&self.up, speed),
            CameraMotion::Down => self.position.multiply_sub(&self.up, speed),
            CameraMotion::YawLeft => self.yaw(-self.rotation_speed),
            CameraMotion::YawRight => self.yaw(self.rotation_speed),
            CameraMotion::PitchUp => self.pitch(-self.rotation_speed),
            CameraMotion::PitchDown => self.pitch(self.rotation_speed),
        }
    }

    /// Rotates the basis about the Y axis.
    pub fn yaw(&mut self, angle: Scalar) -> FrustumResult<()> {
        let rotation = Transform::rotate_y(self.position.context(), angle)?;
        self.rotate_basis(&rotation)
    }

    /// Rotates the basis about the X axis.
    pub fn pitch(&mut self, angle: Scalar) -> FrustumResult<()> {
        let rotation = Transform::rotate_x(self.position.context(), angle)?;
        self.rotate_basis(&rotation)
    }

    fn rotate_basis(&mut self, rotation: &FixedMatrix<4, 4>) -> FrustumResult<()> {
        self.forward = self.forward.multiply(rotation)?;
        self.up = self.up.multiply(rotation)?;
        self.right = self.right.multiply(rotation)?;
        Ok(())
    }

    /// Current position.
    pub fn position(&mut self) -> FrustumResult<[Scalar; 3]> {
        xyz(&mut self.position)
    }

    pub fn forward(&mut self) -> FrustumResult<[Scalar; 3]> {
        xyz(&mut self.forward)
    }

    pub fn up(&mut self) -> FrustumResult<[Scalar; 3]> {
        xyz(&mut self.up)
    }

    pub fn right(&mut self) -> FrustumResult<[Scalar; 3]> {
        xyz(&mut self.right)
    }

    /// Moves the world so the camera sits at the origin.
    pub fn translate_matrix(&mut self) -> FrustumResult<FixedMatrix<4, 4>> {
        let [x, y, z] = self.position()?;
        Transform::translate(self.position.context(), -x, -y, -z)
    }

    /// Expresses world directions in the camera basis.
    ///
    /// Columns are `right`, `up` and `forward`.
    pub fn rotate_matrix(&mut self) -> FrustumResult<FixedMatrix<4, 4>> {
        let [rx, ry, rz] = self.right()?;
        let [ux, uy, uz] = self.up()?;
        let [fx, fy, fz] = self.forward()?;
        FixedMatrix::new(
            self.position.context(),
            [
                [rx, ux, fx, 0.0],
                [ry, uy, fy, 0.0],
                [rz, uz, fz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        )
    }

    /// World-to-camera transform, `translate · rotate`.
    pub fn camera_matrix(&mut self) -> FrustumResult<FixedMatrix<4, 4>> {
        let translate = self.translate_matrix()?;
        let rotate = self.rotate_matrix()?;
        translate.multiply(&rotate)
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("position", &self.position)
            .field("moving_speed", &self.moving_speed)
            .field("rotation_speed", &self.rotation_speed)
            .finish_non_exhaustive()
    }
}

fn xyz(vector: &mut FixedMatrix<1, 4>) -> FrustumResult<[Scalar; 3]> {
    let v = vector.to_host()?;
    Ok([v[0], v[1], v[2]])
}
