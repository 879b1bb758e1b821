//! Blade expansion render pipeline writing the G-buffer

use crate::render::buffer::{dynamic_uniform_layout, BladeAttributeBuffers, CameraBuffer};
use crate::render::program::ShaderProgram;
use crate::render::texture::gbuffer;

/// Vertex-pulling pipeline: no vertex buffers, blades are read from storage
///
/// Group 0 camera, group 1 per-draw parameters (dynamic offset), group 2
/// attribute buffers.
pub struct GrassDrawPipeline {
    pipeline: wgpu::RenderPipeline,
    params_layout: wgpu::BindGroupLayout,
}

impl GrassDrawPipeline {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        params_size: u64,
        camera: &CameraBuffer,
        attributes: &BladeAttributeBuffers,
    ) -> Self {
        let shader = program.create_shader_module(device);
        let params_layout = dynamic_uniform_layout(
            device,
            "grass_draw_params_layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            params_size,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_draw_pipeline_layout"),
            bind_group_layouts: &[camera.bind_group_layout(), &params_layout, attributes.draw_layout()],
            immediate_size: 0,
        });

        let targets = gbuffer::color_target_states();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grass_draw_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Blades are visible from both sides
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: gbuffer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, params_layout }
    }

    pub fn params_layout(&self) -> &wgpu::BindGroupLayout {
        &self.params_layout
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}
