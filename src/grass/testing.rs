//! Test fixtures built from the shipped shaders

use crate::grass::batch::BatchRenderer;
use crate::grass::config::GrassConfig;
use crate::grass::dispatch::ComputeDispatcher;
use crate::grass::field::GrassField;
use crate::grass::tile::TileIdAllocator;
use crate::render::limits::DeviceLimits;
use crate::render::program::ShaderProgram;

pub(crate) fn compute_program() -> ShaderProgram {
    ShaderProgram::from_source("grass_compute.wgsl", include_str!("../../shaders/grass_compute.wgsl"))
        .expect("compute shader validates")
}

pub(crate) fn draw_program() -> ShaderProgram {
    ShaderProgram::from_source("grass_draw.wgsl", include_str!("../../shaders/grass_draw.wgsl"))
        .expect("draw shader validates")
}

pub(crate) fn dispatcher(config: &GrassConfig, limits: DeviceLimits) -> ComputeDispatcher {
    let program = compute_program();
    let layout = program.uniform_layout(0, 0).expect("compute params");
    let [x, _, _] = program.workgroup_size("main").expect("compute entry");
    ComputeDispatcher::new(layout, x, limits, config).expect("dispatcher")
}

pub(crate) fn batcher(config: &GrassConfig) -> BatchRenderer {
    let layout = draw_program().uniform_layout(1, 0).expect("draw params");
    BatchRenderer::new(layout, config).expect("batcher")
}

pub(crate) fn field(config: &GrassConfig, limits: DeviceLimits) -> GrassField {
    GrassField::from_programs(config, &mut TileIdAllocator::new(), &compute_program(), &draw_program(), limits)
        .expect("field")
}
