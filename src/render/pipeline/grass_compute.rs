//! Blade generation compute pipeline

use crate::render::buffer::{dynamic_uniform_layout, BladeAttributeBuffers};
use crate::render::program::ShaderProgram;

/// Writes one tile's blades into an attribute slot per dispatch
///
/// Group 0 holds the per-tile parameters (dynamic offset into the frame's
/// uniform arena), group 1 the attribute buffers.
pub struct GrassComputePipeline {
    pipeline: wgpu::ComputePipeline,
    params_layout: wgpu::BindGroupLayout,
}

impl GrassComputePipeline {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        params_size: u64,
        attributes: &BladeAttributeBuffers,
    ) -> Self {
        let shader = program.create_shader_module(device);
        let params_layout = dynamic_uniform_layout(
            device,
            "grass_compute_params_layout",
            wgpu::ShaderStages::COMPUTE,
            params_size,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_compute_pipeline_layout"),
            bind_group_layouts: &[&params_layout, attributes.compute_layout()],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("grass_compute_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self { pipeline, params_layout }
    }

    pub fn params_layout(&self) -> &wgpu::BindGroupLayout {
        &self.params_layout
    }

    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }
}
