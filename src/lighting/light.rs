//! Light sources

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::render::pipeline::{GpuPointLight, MAX_POINT_LIGHTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    /// Emits from `Light::vector` as a position
    Point,
    /// Parallel rays travelling along `Light::vector`
    Directional,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Position for point lights, normalized travel direction for directional ones
    pub vector: Vec3,
    /// Linear RGB
    pub color: Vec3,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            vector: position,
            color,
        }
    }

    pub fn directional(direction: Vec3, color: Vec3) -> Result<Self> {
        let vector = direction.try_normalize().ok_or_else(|| {
            Error::Configuration(format!("light direction {:?} has no length", direction))
        })?;
        Ok(Self {
            kind: LightKind::Directional,
            vector,
            color,
        })
    }
}

/// The point lights fed to the lighting pass
#[derive(Clone, Debug, Default)]
pub struct PointLights {
    lights: Vec<Light>,
}

impl PointLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: Light) -> Result<()> {
        if light.kind != LightKind::Point {
            return Err(Error::InvalidAssignment(format!(
                "{:?} light cannot join the point light list",
                light.kind
            )));
        }
        if self.lights.len() >= MAX_POINT_LIGHTS {
            return Err(Error::Configuration(format!(
                "at most {} point lights are supported",
                MAX_POINT_LIGHTS
            )));
        }
        self.lights.push(light);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// Fixed-size array for the uniform block, unused entries zeroed
    pub fn to_gpu(&self) -> [GpuPointLight; MAX_POINT_LIGHTS] {
        let mut out = [GpuPointLight::default(); MAX_POINT_LIGHTS];
        for (dst, light) in out.iter_mut().zip(&self.lights) {
            dst.position = light.vector.to_array();
            dst.color = light.color.to_array();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_directional_light() {
        let mut lights = PointLights::new();
        let sun = Light::directional(Vec3::NEG_Y, Vec3::ONE).unwrap();
        assert!(matches!(lights.add(sun), Err(Error::InvalidAssignment(_))));
        assert!(lights.is_empty());
    }

    #[test]
    fn test_capacity() {
        let mut lights = PointLights::new();
        for i in 0..MAX_POINT_LIGHTS {
            lights.add(Light::point(Vec3::splat(i as f32), Vec3::ONE)).unwrap();
        }
        let extra = lights.add(Light::point(Vec3::ZERO, Vec3::ONE));
        assert!(matches!(extra, Err(Error::Configuration(_))));
        assert_eq!(lights.len(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn test_to_gpu() {
        let mut lights = PointLights::new();
        lights.add(Light::point(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.5, 0.25))).unwrap();
        let gpu = lights.to_gpu();
        assert_eq!(gpu[0].position, [0.0, 10.0, 0.0]);
        assert_eq!(gpu[0].color, [1.0, 0.5, 0.25]);
        assert_eq!(gpu[1], GpuPointLight::default());
    }

    #[test]
    fn test_directional_is_normalized() {
        let light = Light::directional(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE).unwrap();
        assert_eq!(light.vector, Vec3::NEG_Y);
        assert!(Light::directional(Vec3::ZERO, Vec3::ONE).is_err());
    }
}
