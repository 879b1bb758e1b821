//! GPU buffer management

pub mod attribute_buffers;
pub mod camera_buffer;
pub mod uniform_arena;

pub use attribute_buffers::{BladeAttribute, BladeAttributeBuffers};
pub use camera_buffer::{CameraBuffer, CameraUniform};
pub use uniform_arena::{dynamic_uniform_layout, UniformArena};
