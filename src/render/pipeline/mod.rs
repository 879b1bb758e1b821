//! Render pipelines

pub mod grass_compute;
pub mod grass_draw;
pub mod lighting;

pub use grass_compute::GrassComputePipeline;
pub use grass_draw::GrassDrawPipeline;
pub use lighting::{GpuPointLight, LightingPipeline, LightingUniforms, MAX_POINT_LIGHTS};
