//! Named uniform blocks
//!
//! A [`UniformLayout`] describes the members of one WGSL uniform struct (name,
//! kind, byte offset). A [`UniformBlock`] is a CPU copy of that struct whose
//! members are written by name with typed setters, and whose bytes are
//! snapshotted into the frame's uniform stream at each dispatch or draw.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::core::error::Error;
use crate::core::types::Result;

/// Scalar, vector and matrix kinds a uniform member can have
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Size in bytes of the member's data (excluding trailing padding)
    pub fn size(self) -> u32 {
        match self {
            UniformKind::Int | UniformKind::Uint | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }
}

/// One named member of a uniform struct
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub kind: UniformKind,
    pub offset: u32,
}

/// Member table of a uniform struct
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformLayout {
    label: String,
    fields: Vec<UniformField>,
    size: u32,
}

impl UniformLayout {
    /// Build a layout, rejecting members that fall outside `size` or overlap
    pub fn new(label: impl Into<String>, size: u32, fields: Vec<UniformField>) -> Result<Self> {
        let label = label.into();
        let mut spans: Vec<(u32, u32, &str)> = Vec::with_capacity(fields.len());
        for field in &fields {
            let end = field.offset + field.kind.size();
            if end > size {
                return Err(Error::Configuration(format!(
                    "uniform '{}' in '{}' ends at byte {} past the block size {}",
                    field.name, label, end, size
                )));
            }
            if let Some((_, _, other)) = spans.iter().find(|(s, e, _)| field.offset < *e && *s < end) {
                return Err(Error::Configuration(format!(
                    "uniform '{}' in '{}' overlaps '{}'",
                    field.name, label, other
                )));
            }
            spans.push((field.offset, end, field.name.as_str()));
        }
        Ok(Self { label, fields, size })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Block size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that every `(name, kind)` pair is present
    pub fn require(&self, members: &[(&str, UniformKind)]) -> Result<()> {
        for &(name, kind) in members {
            self.check(name, kind)?;
        }
        Ok(())
    }

    fn check(&self, name: &str, kind: UniformKind) -> Result<&UniformField> {
        let field = self.field(name).ok_or_else(|| {
            Error::Configuration(format!("uniform '{}' not found in '{}'", name, self.label))
        })?;
        if field.kind != kind {
            return Err(Error::Configuration(format!(
                "uniform '{}' in '{}' is {:?}, not {:?}",
                name, self.label, field.kind, kind
            )));
        }
        Ok(field)
    }
}

/// CPU-side contents of a uniform struct, written member by member
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    /// Zero-initialised block
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size as usize];
        Self { layout, data }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Current contents, laid out as the shader expects
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<()> {
        self.write(name, UniformKind::Int, bytemuck::bytes_of(&value))
    }

    pub fn set_uint(&mut self, name: &str, value: u32) -> Result<()> {
        self.write(name, UniformKind::Uint, bytemuck::bytes_of(&value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<()> {
        self.write(name, UniformKind::Float, bytemuck::bytes_of(&value))
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> Result<()> {
        self.write(name, UniformKind::Vec2, bytemuck::bytes_of(&value))
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> Result<()> {
        self.write(name, UniformKind::Vec3, bytemuck::bytes_of(&value))
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<()> {
        self.write(name, UniformKind::Vec4, bytemuck::bytes_of(&value))
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> Result<()> {
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&value))
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) -> Result<()> {
        let start = self.layout.check(name, kind)?.offset as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytemuck::pod_collect_to_vec(bytes)
    }

    fn field(name: &str, kind: UniformKind, offset: u32) -> UniformField {
        UniformField { name: name.to_string(), kind, offset }
    }

    fn sample_layout() -> UniformLayout {
        UniformLayout::new(
            "sample",
            48,
            vec![
                field("width", UniformKind::Float, 0),
                field("count", UniformKind::Uint, 4),
                field("bias", UniformKind::Int, 8),
                field("pos", UniformKind::Vec2, 16),
                field("color", UniformKind::Vec4, 32),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_setters_write_at_offsets() {
        let mut block = UniformBlock::new(sample_layout());
        block.set_float("width", 4.0).unwrap();
        block.set_uint("count", 7).unwrap();
        block.set_int("bias", -2).unwrap();
        block.set_vec2("pos", Vec2::new(1.5, 2.5)).unwrap();
        block.set_vec4("color", Vec4::new(0.1, 0.2, 0.3, 1.0)).unwrap();

        let bytes = block.bytes();
        assert_eq!(bytes.len(), 48);
        let floats = floats(bytes);
        assert_eq!(floats[0], 4.0);
        assert_eq!(u32::from_ne_bytes(bytes[4..8].try_into().unwrap()), 7);
        assert_eq!(i32::from_ne_bytes(bytes[8..12].try_into().unwrap()), -2);
        assert_eq!(&floats[4..6], &[1.5, 2.5]);
        assert_eq!(&floats[8..12], &[0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_missing_uniform_is_configuration_error() {
        let mut block = UniformBlock::new(sample_layout());
        let err = block.set_float("height", 1.0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut block = UniformBlock::new(sample_layout());
        assert!(matches!(block.set_float("count", 1.0), Err(Error::Configuration(_))));
        assert!(matches!(block.set_uint("bias", 1), Err(Error::Configuration(_))));
        // Failed writes leave the data untouched
        assert!(block.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_require() {
        let layout = sample_layout();
        assert!(layout.require(&[("width", UniformKind::Float), ("pos", UniformKind::Vec2)]).is_ok());
        assert!(layout.require(&[("pos", UniformKind::Vec3)]).is_err());
    }

    #[test]
    fn test_layout_rejects_out_of_bounds_and_overlap() {
        let too_far = UniformLayout::new("bad", 16, vec![field("m", UniformKind::Mat4, 0)]);
        assert!(matches!(too_far, Err(Error::Configuration(_))));

        let overlapping = UniformLayout::new(
            "bad",
            32,
            vec![field("a", UniformKind::Vec4, 0), field("b", UniformKind::Float, 8)],
        );
        assert!(matches!(overlapping, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_mat4_column_major() {
        let layout = UniformLayout::new("m", 64, vec![field("viewProj", UniformKind::Mat4, 0)]).unwrap();
        let mut block = UniformBlock::new(layout);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        block.set_mat4("viewProj", m).unwrap();
        let floats = floats(block.bytes());
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }
}
