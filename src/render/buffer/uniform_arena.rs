//! Uniform records addressed with dynamic offsets
//!
//! The frame's per-dispatch and per-draw parameter records are packed on the
//! CPU at a fixed stride and uploaded with one write. Each pass then binds
//! its record by offset.

use crate::core::error::Error;
use crate::core::types::Result;

/// Bind group layout for one dynamically offset uniform at binding 0
pub fn dynamic_uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    record_size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(record_size),
            },
            count: None,
        }],
    })
}

pub struct UniformArena {
    buffer: wgpu::Buffer,
    stride: u32,
    records: u32,
}

impl UniformArena {
    /// Room for `records` records, `stride` bytes apart
    pub fn new(device: &wgpu::Device, stride: u32, records: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_arena"),
            size: Self::byte_size(stride, records),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, stride, records }
    }

    pub fn byte_size(stride: u32, records: u32) -> u64 {
        stride as u64 * records.max(1) as u64
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn records(&self) -> u32 {
        self.records
    }

    /// Fail when `len` bytes of packed records would not fit
    pub fn check_fits(&self, len: usize) -> Result<()> {
        let capacity = Self::byte_size(self.stride, self.records);
        if len as u64 > capacity {
            return Err(Error::Gpu(format!(
                "frame needs {} bytes of uniform records, arena holds {}",
                len, capacity
            )));
        }
        Ok(())
    }

    pub fn upload(&self, queue: &wgpu::Queue, bytes: &[u8]) -> Result<()> {
        self.check_fits(bytes.len())?;
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        Ok(())
    }

    /// Bind group exposing one `record_size` window, moved by dynamic offset
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        record_size: u64,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(record_size),
                }),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_never_zero() {
        assert_eq!(UniformArena::byte_size(256, 0), 256);
        assert_eq!(UniformArena::byte_size(256, 20_000), 5_120_000);
    }
}
