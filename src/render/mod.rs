//! Rendering system and GPU interfaces

pub mod buffer;
pub mod context;
pub mod limits;
pub mod pipeline;
pub mod program;
pub mod renderer;
pub mod texture;
pub mod uniforms;

pub use context::GpuContext;
pub use limits::{DeviceLimits, DispatchSize};
pub use program::{GrassPrograms, ShaderProgram};
pub use renderer::GrassRenderer;
pub use uniforms::{UniformBlock, UniformField, UniformKind, UniformLayout};
