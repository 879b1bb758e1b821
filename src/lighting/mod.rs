//! Lights and material for the deferred grass shading pass

pub mod config;
pub mod light;
pub mod material;

pub use config::{LightingConfig, MaterialConfig, PointLightConfig};
pub use light::{Light, LightKind, PointLights};
pub use material::Material;

use crate::core::types::{Result, Vec3};
use crate::render::pipeline::LightingUniforms;

/// Sun, point lights and material of the scene
#[derive(Clone, Debug)]
pub struct SceneLighting {
    pub sun: Light,
    pub sun_intensity: f32,
    pub point_lights: PointLights,
    pub material: Material,
}

impl SceneLighting {
    pub fn from_config(config: &LightingConfig) -> Result<Self> {
        let sun = Light::directional(Vec3::from(config.sun_direction), Vec3::from(config.sun_color))?;

        let mut point_lights = PointLights::new();
        for light in &config.point_lights {
            point_lights.add(Light::point(Vec3::from(light.position), Vec3::from(light.color)))?;
        }

        let mut material = Material::default();
        material.set_ambient(config.material.ambient);
        material.set_diffuse(config.material.diffuse);
        material.set_specular(config.material.specular);
        material.set_shininess(config.material.shininess);

        log::info!("Lighting: sun {:?}, {} point lights", sun.vector, point_lights.len());

        Ok(Self {
            sun,
            sun_intensity: config.sun_intensity.max(0.0),
            point_lights,
            material,
        })
    }

    /// Uniform block for the lighting pass as seen from `camera_position`
    pub fn uniforms(&self, camera_position: Vec3) -> LightingUniforms {
        LightingUniforms {
            camera_position: camera_position.to_array(),
            point_light_count: self.point_lights.len() as u32,
            sun_direction: self.sun.vector.to_array(),
            sun_intensity: self.sun_intensity,
            sun_color: self.sun.color.to_array(),
            ambient: self.material.ambient(),
            diffuse: self.material.diffuse(),
            specular: self.material.specular(),
            shininess: self.material.shininess(),
            _pad: 0.0,
            point_lights: self.point_lights.to_gpu(),
        }
    }
}
