//! Surface response of the grass blades

/// Blinn-Phong coefficients; negative writes are ignored with a warning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    ambient: f32,
    diffuse: f32,
    specular: f32,
    shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.05,
            diffuse: 1.0,
            specular: 1.0,
            shininess: 32.0,
        }
    }
}

fn accept(name: &str, value: f32) -> bool {
    if value < 0.0 || value.is_nan() {
        log::warn!("Ignoring material {} = {}: must be non-negative", name, value);
        return false;
    }
    true
}

impl Material {
    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn diffuse(&self) -> f32 {
        self.diffuse
    }

    pub fn specular(&self) -> f32 {
        self.specular
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn set_ambient(&mut self, value: f32) {
        if accept("ambient", value) {
            self.ambient = value;
        }
    }

    pub fn set_diffuse(&mut self, value: f32) {
        if accept("diffuse", value) {
            self.diffuse = value;
        }
    }

    pub fn set_specular(&mut self, value: f32) {
        if accept("specular", value) {
            self.specular = value;
        }
    }

    pub fn set_shininess(&mut self, value: f32) {
        if accept("shininess", value) {
            self.shininess = value;
        }
    }
}
