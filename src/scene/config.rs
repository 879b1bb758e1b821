//! Scene configuration: window, camera, grass field, lighting and shaders

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::camera::Camera;
use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::grass::GrassConfig;
use crate::lighting::LightingConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "grassfield".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Start position; the field center when unset
    pub position: Option<[f32; 3]>,
    /// Point to face; straight ahead along -Z when unset
    pub look_at: Option<[f32; 3]>,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second
    pub move_speed: f32,
    /// Milliradians of turn per pixel of mouse motion
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: None,
            look_at: None,
            fov_y: 45.0,
            near: 0.1,
            far: 100.0,
            move_speed: 5.0,
            sensitivity: 3.0,
        }
    }
}

impl CameraConfig {
    /// Build the start camera; `field_center` fills in an unset position
    pub fn build(&self, field_center: Vec3, aspect: f32) -> Result<Camera> {
        let position = self.position.map(Vec3::from).unwrap_or(field_center);
        let target = self
            .look_at
            .map(Vec3::from)
            .unwrap_or(position + Vec3::new(0.0, -0.1, -1.0));

        let forward = (target - position).try_normalize().ok_or_else(|| {
            Error::Configuration("camera look_at coincides with its position".into())
        })?;
        if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            return Err(Error::Configuration("camera cannot look straight up or down".into()));
        }

        let mut camera = Camera::new(position, self.fov_y, aspect).with_clip(self.near, self.far);
        camera.point_at(target, Vec3::Y);
        Ok(camera)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub compute: PathBuf,
    pub draw: PathBuf,
    pub lighting: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            compute: PathBuf::from("shaders/grass_compute.wgsl"),
            draw: PathBuf::from("shaders/grass_draw.wgsl"),
            lighting: PathBuf::from("shaders/lighting.wgsl"),
        }
    }
}

/// Everything the application needs to start
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub grass: GrassConfig,
    pub lighting: LightingConfig,
    pub shaders: ShaderPaths,
}

impl SceneConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grass.validate()?;

        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Configuration(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        let camera = &self.camera;
        if !(camera.fov_y > 0.0 && camera.fov_y < 180.0) {
            return Err(Error::Configuration(format!(
                "camera fov_y must lie in (0, 180) degrees, got {}",
                camera.fov_y
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::Configuration(format!(
                "camera clip range must satisfy 0 < near < far, got {}..{}",
                camera.near, camera.far
            )));
        }
        if camera.move_speed < 0.0 || camera.sensitivity < 0.0 {
            return Err(Error::Configuration("camera speed and sensitivity must be non-negative".into()));
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}
