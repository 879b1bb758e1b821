//! Deferred lighting pass: G-buffer to swapchain

use bytemuck::{Pod, Zeroable};

use crate::render::program::ShaderProgram;

/// Capacity of the point light array in lighting.wgsl
pub const MAX_POINT_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

/// Lighting uniforms (must match `Lighting` in lighting.wgsl, 320 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightingUniforms {
    pub camera_position: [f32; 3],
    pub point_light_count: u32,
    /// Normalized direction the sunlight travels
    pub sun_direction: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub _pad: f32,
    pub point_lights: [GpuPointLight; MAX_POINT_LIGHTS],
}

impl Default for LightingUniforms {
    fn default() -> Self {
        Self {
            camera_position: [0.0; 3],
            point_light_count: 0,
            sun_direction: [0.0, -1.0, 0.0],
            sun_intensity: 1.0,
            sun_color: [1.0; 3],
            ambient: 0.05,
            diffuse: 1.0,
            specular: 1.0,
            shininess: 32.0,
            _pad: 0.0,
            point_lights: [GpuPointLight::default(); MAX_POINT_LIGHTS],
        }
    }
}

/// Fullscreen Blinn-Phong pass
pub struct LightingPipeline {
    pipeline: wgpu::RenderPipeline,
    uniforms_buffer: wgpu::Buffer,
    uniforms_bind_group: wgpu::BindGroup,
}

impl LightingPipeline {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        surface_format: wgpu::TextureFormat,
        gbuffer_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = program.create_shader_module(device);

        let uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lighting_uniforms"),
            size: std::mem::size_of::<LightingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting_uniforms_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniforms_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting_uniforms_bind_group"),
            layout: &uniforms_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lighting_pipeline_layout"),
            bind_group_layouts: &[&uniforms_layout, gbuffer_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lighting_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // Fullscreen triangle
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniforms_buffer,
            uniforms_bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniforms: &LightingUniforms) {
        queue.write_buffer(&self.uniforms_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, gbuffer: &wgpu::BindGroup) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lighting_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniforms_bind_group, &[]);
        pass.set_bind_group(1, gbuffer, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighting_uniforms_match_shader_layout() {
        let program =
            ShaderProgram::from_source("lighting", include_str!("../../../shaders/lighting.wgsl")).unwrap();
        let layout = program.uniform_layout(0, 0).unwrap();
        assert_eq!(layout.size() as usize, std::mem::size_of::<LightingUniforms>());
        assert_eq!(layout.field("sunDirection").unwrap().offset, 16);
        assert_eq!(layout.field("shininess").unwrap().offset, 56);
    }

    #[test]
    fn test_point_light_stride() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 32);
        assert_eq!(std::mem::size_of::<LightingUniforms>(), 320);
    }
}
