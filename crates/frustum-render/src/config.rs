//! Renderer configuration.
//!
//! Parameters that control the view: output size, camera frustum,
//! camera motion speeds and the object's idle spin.

use std::path::Path;

use serde::{Deserialize, Serialize};

use frustum_types::constants::{
    DEFAULT_FAR_PLANE, DEFAULT_HEIGHT, DEFAULT_H_FOV, DEFAULT_MOVING_SPEED, DEFAULT_NEAR_PLANE,
    DEFAULT_ROTATION_SPEED, DEFAULT_SPIN_SPEED, DEFAULT_WIDTH,
};
use frustum_types::{FrustumError, FrustumResult, Scalar};

/// Configuration for a render session.
///
/// Every field has a default, so a TOML file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Horizontal field of view (radians).
    pub h_fov: Scalar,
    /// Distance to the near clipping plane.
    pub near_plane: Scalar,
    /// Distance to the far clipping plane.
    pub far_plane: Scalar,
    /// Camera translation per motion step.
    pub moving_speed: Scalar,
    /// Camera rotation per motion step (radians).
    pub rotation_speed: Scalar,
    /// Object rotation about Y per frame (radians). Zero disables it.
    pub spin_speed: Scalar,
    /// Initial camera position.
    pub camera_position: [Scalar; 3],
    /// Frames rendered by a headless run.
    pub frames: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            h_fov: DEFAULT_H_FOV,
            near_plane: DEFAULT_NEAR_PLANE,
            far_plane: DEFAULT_FAR_PLANE,
            moving_speed: DEFAULT_MOVING_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            spin_speed: DEFAULT_SPIN_SPEED,
            camera_position: [0.5, 0.5, -4.0],
            frames: 1,
        }
    }
}

impl RendererConfig {
    #[inline]
    pub fn half_width(&self) -> Scalar {
        Scalar::from(self.width) / 2.0
    }

    #[inline]
    pub fn half_height(&self) -> Scalar {
        Scalar::from(self.height) / 2.0
    }

    /// Vertical field of view, scaled from `h_fov` by the aspect ratio.
    pub fn v_fov(&self) -> Scalar {
        self.h_fov * Scalar::from(self.height) / Scalar::from(self.width)
    }

    /// Rejects values that would produce a degenerate frustum.
    pub fn validate(&self) -> FrustumResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FrustumError::InvalidConfig(format!(
                "output size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.h_fov > 0.0 && self.h_fov < std::f64::consts::PI) {
            return Err(FrustumError::InvalidConfig(format!(
                "h_fov must lie in (0, π), got {}",
                self.h_fov
            )));
        }
        if !(self.near_plane > 0.0) {
            return Err(FrustumError::InvalidConfig(format!(
                "near_plane must be positive, got {}",
                self.near_plane
            )));
        }
        if !(self.far_plane > self.near_plane) || !self.far_plane.is_finite() {
            return Err(FrustumError::InvalidConfig(format!(
                "far_plane ({}) must be finite and beyond near_plane ({})",
                self.far_plane, self.near_plane
            )));
        }
        if self.camera_position.iter().any(|c| !c.is_finite()) {
            return Err(FrustumError::InvalidConfig(
                "camera_position must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> FrustumResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| FrustumError::Serialization(format!("TOML parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FrustumResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML, e.g. to write a starter file.
    pub fn to_toml_string(&self) -> FrustumResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FrustumError::Serialization(format!("TOML serialization failed: {e}")))
    }
}
