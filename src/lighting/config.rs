//! Serialized lighting setup

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for PointLightConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, 0.0],
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            ambient: 0.05,
            diffuse: 1.0,
            specular: 1.0,
            shininess: 32.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction the sunlight travels
    pub sun_direction: [f32; 3],
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub point_lights: Vec<PointLightConfig>,
    pub material: MaterialConfig,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            sun_direction: [-0.4, -1.0, -0.3],
            sun_color: [1.0, 0.96, 0.9],
            sun_intensity: 0.8,
            point_lights: vec![PointLightConfig::default()],
            material: MaterialConfig::default(),
        }
    }
}
