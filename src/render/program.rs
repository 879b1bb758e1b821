//! WGSL shader programs: loading, validation and reflection
//!
//! Sources are parsed and validated with naga before any GPU object is
//! created, so a broken shader surfaces as a configuration error with the
//! compiler's diagnostic instead of a device-level failure.

use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::uniforms::{UniformField, UniformKind, UniformLayout};

/// A validated WGSL program
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    source: String,
    module: naga::Module,
}

impl ShaderProgram {
    /// Read, parse and validate a WGSL file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read shader {}: {}", path.display(), e))
        })?;
        Self::from_source(path.display().to_string(), source)
    }

    /// Parse and validate WGSL text
    pub fn from_source(label: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let source = source.into();

        let module = naga::front::wgsl::parse_str(&source).map_err(|e| {
            Error::Configuration(format!("{} failed to compile:\n{}", label, e.emit_to_string(&source)))
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| {
                Error::Configuration(format!("{} failed validation:\n{}", label, e.emit_to_string(&source)))
            })?;

        log::debug!("Validated shader {}", label);
        Ok(Self { label, source, module })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Member table of the uniform struct bound at `@group(group) @binding(binding)`
    pub fn uniform_layout(&self, group: u32, binding: u32) -> Result<UniformLayout> {
        let var = self
            .module
            .global_variables
            .iter()
            .map(|(_, var)| var)
            .find(|var| {
                var.space == naga::AddressSpace::Uniform
                    && var
                        .binding
                        .as_ref()
                        .is_some_and(|b| b.group == group && b.binding == binding)
            })
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "{} has no uniform at @group({}) @binding({})",
                    self.label, group, binding
                ))
            })?;

        let ty = &self.module.types[var.ty];
        let naga::TypeInner::Struct { members, span } = &ty.inner else {
            return Err(Error::Configuration(format!(
                "uniform at @group({}) @binding({}) in {} is not a struct",
                group, binding, self.label
            )));
        };

        let mut fields = Vec::with_capacity(members.len());
        for member in members {
            let Some(name) = &member.name else { continue };
            // Members of other kinds (arrays, nested structs) are not settable by name
            let Some(kind) = uniform_kind(&self.module.types[member.ty].inner) else {
                continue;
            };
            fields.push(UniformField {
                name: name.clone(),
                kind,
                offset: member.offset,
            });
        }

        let label = ty.name.clone().unwrap_or_else(|| self.label.clone());
        UniformLayout::new(label, *span, fields)
    }

    /// `@workgroup_size` of a compute entry point
    pub fn workgroup_size(&self, entry_point: &str) -> Result<[u32; 3]> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga::ShaderStage::Compute && ep.name == entry_point)
            .map(|ep| ep.workgroup_size)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "{} has no compute entry point '{}'",
                    self.label, entry_point
                ))
            })
    }

    /// Create the GPU shader module from the validated source
    pub fn create_shader_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        })
    }
}

/// The three programs a grass frame runs
#[derive(Debug)]
pub struct GrassPrograms {
    /// Blade generation, `main` compute entry
    pub compute: ShaderProgram,
    /// Blade expansion into the G-buffer
    pub draw: ShaderProgram,
    /// Deferred lighting
    pub lighting: ShaderProgram,
}

impl GrassPrograms {
    pub fn load(compute: &Path, draw: &Path, lighting: &Path) -> Result<Self> {
        let programs = Self {
            compute: ShaderProgram::load(compute)?,
            draw: ShaderProgram::load(draw)?,
            lighting: ShaderProgram::load(lighting)?,
        };
        log::info!(
            "Loaded shaders {}, {}, {}",
            compute.display(),
            draw.display(),
            lighting.display()
        );
        Ok(programs)
    }

    /// Programs compiled into the binary
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            compute: ShaderProgram::from_source("grass_compute.wgsl", include_str!("../../shaders/grass_compute.wgsl"))?,
            draw: ShaderProgram::from_source("grass_draw.wgsl", include_str!("../../shaders/grass_draw.wgsl"))?,
            lighting: ShaderProgram::from_source("lighting.wgsl", include_str!("../../shaders/lighting.wgsl"))?,
        })
    }
}

fn uniform_kind(inner: &naga::TypeInner) -> Option<UniformKind> {
    use naga::{ScalarKind, TypeInner, VectorSize};

    match *inner {
        TypeInner::Scalar(naga::Scalar { kind, width: 4 }) => match kind {
            ScalarKind::Sint => Some(UniformKind::Int),
            ScalarKind::Uint => Some(UniformKind::Uint),
            ScalarKind::Float => Some(UniformKind::Float),
            _ => None,
        },
        TypeInner::Vector {
            size,
            scalar: naga::Scalar { kind: ScalarKind::Float, width: 4 },
        } => match size {
            VectorSize::Bi => Some(UniformKind::Vec2),
            VectorSize::Tri => Some(UniformKind::Vec3),
            VectorSize::Quad => Some(UniformKind::Vec4),
        },
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar: naga::Scalar { kind: ScalarKind::Float, width: 4 },
        } => Some(UniformKind::Mat4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPUTE: &str = include_str!("../../shaders/grass_compute.wgsl");
    const DRAW: &str = include_str!("../../shaders/grass_draw.wgsl");
    const LIGHTING: &str = include_str!("../../shaders/lighting.wgsl");

    #[test]
    fn test_shipped_shaders_validate() {
        for (label, source) in [("compute", COMPUTE), ("draw", DRAW), ("lighting", LIGHTING)] {
            if let Err(e) = ShaderProgram::from_source(label, source) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn test_compute_reflection() {
        let program = ShaderProgram::from_source("compute", COMPUTE).unwrap();
        let layout = program.uniform_layout(0, 0).unwrap();
        assert_eq!(layout.size(), 48);

        let tile_pos = layout.field("tilePos").unwrap();
        assert_eq!(tile_pos.kind, UniformKind::Vec2);
        assert_eq!(tile_pos.offset, 16);
        assert_eq!(layout.field("tileID").unwrap().offset, 24);
        assert_eq!(layout.field("tileWidth").unwrap().kind, UniformKind::Float);
        assert_eq!(layout.field("maxBladesPerSlot").unwrap().kind, UniformKind::Uint);

        assert_eq!(program.workgroup_size("main").unwrap(), [64, 1, 1]);
    }

    #[test]
    fn test_draw_reflection() {
        let program = ShaderProgram::from_source("draw", DRAW).unwrap();
        let camera = program.uniform_layout(0, 0).unwrap();
        assert_eq!(camera.size(), 80);
        assert_eq!(camera.field("viewProj").unwrap().kind, UniformKind::Mat4);
        assert_eq!(camera.field("position").unwrap().offset, 64);

        let params = program.uniform_layout(1, 0).unwrap();
        assert_eq!(params.size(), 16);
        assert_eq!(params.field("tileLOD").unwrap().kind, UniformKind::Uint);
        assert_eq!(params.field("time").unwrap().kind, UniformKind::Float);
    }

    #[test]
    fn test_lighting_reflection_skips_arrays() {
        let program = ShaderProgram::from_source("lighting", LIGHTING).unwrap();
        let layout = program.uniform_layout(0, 0).unwrap();
        assert_eq!(layout.size(), 320);
        assert!(layout.field("pointLights").is_none());
        assert_eq!(layout.field("shininess").unwrap().offset, 56);
    }

    #[test]
    fn test_missing_binding() {
        let program = ShaderProgram::from_source("compute", COMPUTE).unwrap();
        assert!(matches!(program.uniform_layout(3, 0), Err(Error::Configuration(_))));
        assert!(matches!(program.workgroup_size("nope"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_syntax_error_is_configuration_error() {
        let err = ShaderProgram::from_source("broken", "fn main( {").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_validation_error_is_configuration_error() {
        // Well-formed but ill-typed
        let err = ShaderProgram::from_source("typed", "fn f() -> f32 { return 1u; }").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShaderProgram::load(dir.path().join("missing.wgsl")).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compute.wgsl");
        std::fs::write(&path, COMPUTE).unwrap();
        let program = ShaderProgram::load(&path).unwrap();
        assert!(program.label().ends_with("compute.wgsl"));
        assert_eq!(program.source(), COMPUTE);
    }

    #[test]
    fn test_programs_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = [("c.wgsl", COMPUTE), ("d.wgsl", DRAW), ("l.wgsl", LIGHTING)]
            .iter()
            .map(|(name, source)| {
                let path = dir.path().join(name);
                std::fs::write(&path, source).unwrap();
                path
            })
            .collect();

        let programs = GrassPrograms::load(&paths[0], &paths[1], &paths[2]).unwrap();
        assert_eq!(programs.compute.workgroup_size("main").unwrap(), [64, 1, 1]);
        assert_eq!(programs.draw.source(), DRAW);

        let missing = GrassPrograms::load(&dir.path().join("none.wgsl"), &paths[1], &paths[2]);
        assert!(matches!(missing, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_builtin_programs() {
        let programs = GrassPrograms::builtin().unwrap();
        assert_eq!(programs.lighting.label(), "lighting.wgsl");
    }
}
