//! Frame encoding for the grass field
//!
//! The scheduler records a stream of dispatches, barriers and draws. Here the
//! stream becomes wgpu passes: each run of dispatches is one compute pass,
//! each run of draws one render pass into the G-buffer. Pass boundaries are
//! where wgpu synchronizes storage writes against the reads that follow, so
//! every recorded barrier falls on one.

use crate::core::camera::Camera;
use crate::core::types::Result;
use crate::grass::{FrameCommands, FrameStats, GpuCommand, GrassField};
use crate::render::buffer::{BladeAttributeBuffers, CameraBuffer, UniformArena};
use crate::render::context::GpuContext;
use crate::render::pipeline::{GrassComputePipeline, GrassDrawPipeline, LightingPipeline, LightingUniforms};
use crate::render::program::GrassPrograms;
use crate::render::texture::GBuffer;

const CLEAR_DEPTH: f32 = 1.0;

/// Smallest multiple of `alignment` that holds `size` bytes
pub fn uniform_stride(size: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    size.max(1).div_ceil(alignment) * alignment
}

/// Same-kind neighbours share a pass
fn same_pass(a: &GpuCommand, b: &GpuCommand) -> bool {
    matches!(
        (a, b),
        (GpuCommand::Dispatch { .. }, GpuCommand::Dispatch { .. }) | (GpuCommand::Draw { .. }, GpuCommand::Draw { .. })
    )
}

pub struct GrassRenderer {
    camera: CameraBuffer,
    attributes: BladeAttributeBuffers,
    arena: UniformArena,
    compute: GrassComputePipeline,
    draw: GrassDrawPipeline,
    lighting: LightingPipeline,
    gbuffer: GBuffer,
    compute_params: wgpu::BindGroup,
    draw_params: wgpu::BindGroup,
    commands: FrameCommands,
}

impl GrassRenderer {
    pub fn new(ctx: &GpuContext, programs: &GrassPrograms, field: &GrassField) -> Result<Self> {
        let device = &ctx.device;
        let config = field.config();
        let limits = ctx.limits();

        let compute_params_size = programs.compute.uniform_layout(0, 0)?.size();
        let draw_params_size = programs.draw.uniform_layout(1, 0)?.size();
        let stride = uniform_stride(compute_params_size.max(draw_params_size), limits.uniform_offset_alignment);

        let camera = CameraBuffer::new(device);
        let attributes = BladeAttributeBuffers::new(device, config.attribute_capacity())?;
        // At most one dispatch and one draw per tile
        let arena = UniformArena::new(device, stride, 2 * field.tile_count() as u32);

        let compute = GrassComputePipeline::new(device, &programs.compute, compute_params_size as u64, &attributes);
        let draw = GrassDrawPipeline::new(device, &programs.draw, draw_params_size as u64, &camera, &attributes);

        let (width, height) = ctx.size();
        let gbuffer = GBuffer::new(device, width, height);
        let lighting = LightingPipeline::new(device, &programs.lighting, ctx.format(), gbuffer.bind_group_layout());

        let compute_params = arena.bind_group(
            device,
            "grass_compute_params",
            compute.params_layout(),
            compute_params_size as u64,
        );
        let draw_params = arena.bind_group(device, "grass_draw_params", draw.params_layout(), draw_params_size as u64);

        log::info!(
            "Grass renderer: {} attribute slots, uniform stride {} bytes, arena of {} records",
            config.parallel_slots,
            stride,
            arena.records()
        );

        Ok(Self {
            camera,
            attributes,
            arena,
            compute,
            draw,
            lighting,
            gbuffer,
            compute_params,
            draw_params,
            commands: FrameCommands::new(config.parallel_slots, stride),
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.gbuffer.resize(device, width, height);
    }

    /// Commands recorded by the last `render`
    pub fn commands(&self) -> &FrameCommands {
        &self.commands
    }

    /// Schedule the field, encode the frame and present it
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        field: &mut GrassField,
        camera: &Camera,
        lighting: &LightingUniforms,
    ) -> Result<FrameStats> {
        self.commands.clear();
        let stats = field.render(&camera.snapshot(), &mut self.commands)?;

        let frame = match ctx.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                ctx.surface.configure(&ctx.device, &ctx.config);
                return Ok(stats);
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.arena.upload(&ctx.queue, self.commands.uniform_bytes())?;
        self.camera.update(&ctx.queue, camera, field.time());
        self.lighting.update(&ctx.queue, lighting);

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grass_frame_encoder"),
        });

        self.clear_gbuffer(&mut encoder);
        for run in self.commands.commands().chunk_by(same_pass) {
            match run[0] {
                GpuCommand::Dispatch { .. } => self.encode_dispatches(&mut encoder, run),
                GpuCommand::Draw { .. } => self.encode_draws(&mut encoder, run),
                GpuCommand::Barrier => {}
            }
        }
        self.lighting.render(&mut encoder, &view, self.gbuffer.bind_group());

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(stats)
    }

    fn encode_dispatches(&self, encoder: &mut wgpu::CommandEncoder, run: &[GpuCommand]) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("grass_generate_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(self.compute.pipeline());
        pass.set_bind_group(1, self.attributes.compute_bind_group(), &[]);

        for command in run {
            if let GpuCommand::Dispatch { dispatch, uniform_offset } = command {
                pass.set_bind_group(0, &self.compute_params, &[*uniform_offset]);
                pass.dispatch_workgroups(dispatch.size.x, dispatch.size.y, dispatch.size.z);
            }
        }
    }

    fn encode_draws(&self, encoder: &mut wgpu::CommandEncoder, run: &[GpuCommand]) {
        let mut pass = self.begin_gbuffer_pass(encoder, "grass_draw_pass", false);
        pass.set_pipeline(self.draw.pipeline());
        pass.set_bind_group(0, self.camera.bind_group(), &[]);
        pass.set_bind_group(2, self.attributes.draw_bind_group(), &[]);

        for command in run {
            if let GpuCommand::Draw { draw, uniform_offset } = command {
                pass.set_bind_group(1, &self.draw_params, &[*uniform_offset]);
                pass.draw(0..draw.vertex_count(), 0..1);
            }
        }
    }

    fn clear_gbuffer(&self, encoder: &mut wgpu::CommandEncoder) {
        // Dropping the pass ends it; clears are its only effect
        let _pass = self.begin_gbuffer_pass(encoder, "gbuffer_clear_pass", true);
    }

    fn begin_gbuffer_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        clear: bool,
    ) -> wgpu::RenderPass<'e> {
        let color_load = if clear {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if clear {
            wgpu::LoadOp::Clear(CLEAR_DEPTH)
        } else {
            wgpu::LoadOp::Load
        };

        let color_attachments = self.gbuffer.color_views().each_ref().map(|view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.gbuffer.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
