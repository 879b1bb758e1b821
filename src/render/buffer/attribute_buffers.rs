//! Per-blade attribute storage shared by the generate and draw passes
//!
//! Every attribute lives in its own storage buffer of `capacity` elements,
//! split into `parallel_slots` slots of `max_blades` elements. The compute
//! pass binds them read-write, the draw pass read-only.

use crate::core::error::Error;
use crate::core::types::Result;

/// One blade attribute channel, in binding order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BladeAttribute {
    Position,
    Height,
    Width,
    Color,
    Rotation,
    Tilt,
    Bend,
}

impl BladeAttribute {
    pub const ALL: [BladeAttribute; 7] = [
        BladeAttribute::Position,
        BladeAttribute::Height,
        BladeAttribute::Width,
        BladeAttribute::Color,
        BladeAttribute::Rotation,
        BladeAttribute::Tilt,
        BladeAttribute::Bend,
    ];

    pub fn binding(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            BladeAttribute::Position => "blade_positions",
            BladeAttribute::Height => "blade_heights",
            BladeAttribute::Width => "blade_widths",
            BladeAttribute::Color => "blade_colors",
            BladeAttribute::Rotation => "blade_rotations",
            BladeAttribute::Tilt => "blade_tilts",
            BladeAttribute::Bend => "blade_bends",
        }
    }

    /// Bytes per element (vec4 / f32 / vec2 of f32)
    pub fn element_size(self) -> u64 {
        match self {
            BladeAttribute::Position | BladeAttribute::Color => 16,
            BladeAttribute::Bend => 8,
            _ => 4,
        }
    }

    pub fn buffer_size(self, capacity: u64) -> u64 {
        self.element_size() * capacity
    }
}

/// Storage buffers plus the compute and draw views onto them
pub struct BladeAttributeBuffers {
    buffers: Vec<wgpu::Buffer>,
    capacity: u64,
    compute_layout: wgpu::BindGroupLayout,
    compute_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_bind_group: wgpu::BindGroup,
}

impl BladeAttributeBuffers {
    /// Allocate `capacity` elements per attribute
    pub fn new(device: &wgpu::Device, capacity: u64) -> Result<Self> {
        let limits = device.limits();
        if (BladeAttribute::ALL.len() as u32) > limits.max_storage_buffers_per_shader_stage {
            return Err(Error::Gpu(format!(
                "device binds {} storage buffers per stage, blades need {}",
                limits.max_storage_buffers_per_shader_stage,
                BladeAttribute::ALL.len()
            )));
        }
        for attribute in BladeAttribute::ALL {
            let size = attribute.buffer_size(capacity);
            if size > limits.max_storage_buffer_binding_size as u64 || size > limits.max_buffer_size {
                return Err(Error::Gpu(format!(
                    "{} needs {} bytes, device allows {}",
                    attribute.label(),
                    size,
                    limits.max_storage_buffer_binding_size
                )));
            }
        }

        let buffers: Vec<wgpu::Buffer> = BladeAttribute::ALL
            .iter()
            .map(|attribute| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(attribute.label()),
                    size: attribute.buffer_size(capacity).max(attribute.element_size()),
                    usage: wgpu::BufferUsages::STORAGE,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let compute_layout = Self::create_layout(
            device,
            "blade_attributes_compute_layout",
            wgpu::ShaderStages::COMPUTE,
            false,
        );
        let draw_layout =
            Self::create_layout(device, "blade_attributes_draw_layout", wgpu::ShaderStages::VERTEX, true);
        let compute_bind_group =
            Self::create_bind_group(device, "blade_attributes_compute_bind_group", &compute_layout, &buffers);
        let draw_bind_group =
            Self::create_bind_group(device, "blade_attributes_draw_bind_group", &draw_layout, &buffers);

        log::debug!(
            "Blade attribute buffers: {} elements, {} bytes total",
            capacity,
            BladeAttribute::ALL.iter().map(|a| a.buffer_size(capacity)).sum::<u64>()
        );

        Ok(Self {
            buffers,
            capacity,
            compute_layout,
            compute_bind_group,
            draw_layout,
            draw_bind_group,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn buffer(&self, attribute: BladeAttribute) -> &wgpu::Buffer {
        &self.buffers[attribute as usize]
    }

    pub fn compute_layout(&self) -> &wgpu::BindGroupLayout {
        &self.compute_layout
    }

    pub fn compute_bind_group(&self) -> &wgpu::BindGroup {
        &self.compute_bind_group
    }

    pub fn draw_layout(&self) -> &wgpu::BindGroupLayout {
        &self.draw_layout
    }

    pub fn draw_bind_group(&self) -> &wgpu::BindGroup {
        &self.draw_bind_group
    }

    fn create_layout(
        device: &wgpu::Device,
        label: &str,
        visibility: wgpu::ShaderStages,
        read_only: bool,
    ) -> wgpu::BindGroupLayout {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = BladeAttribute::ALL
            .iter()
            .map(|attribute| wgpu::BindGroupLayoutEntry {
                binding: attribute.binding(),
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &entries,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffers: &[wgpu::Buffer],
    ) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = BladeAttribute::ALL
            .iter()
            .zip(buffers)
            .map(|(attribute, buffer)| wgpu::BindGroupEntry {
                binding: attribute.binding(),
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }
}
