//! GPU uniform buffer for camera data

use bytemuck::{Pod, Zeroable};

use crate::core::camera::Camera;

/// Camera uniform data for GPU (must match `Camera` in grass_draw.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// View-projection matrix (64 bytes, offset 0)
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (12 bytes, offset 64)
    pub position: [f32; 3],
    /// Field clock in seconds, shares the vec3 padding slot (offset 76)
    pub time: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera, time: f32) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: camera.position.to_array(),
            time,
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            time: 0.0,
        }
    }
}

/// Camera uniform at group 0 of the grass draw pipeline
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl CameraBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        use wgpu::util::DeviceExt;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_camera"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let binding = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<CameraUniform>() as u64),
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_camera_layout"),
            entries: &[binding],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_camera_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group_layout, bind_group }
    }

    /// Upload the camera and the field clock
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera, time: f32) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera, time)));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::program::ShaderProgram;
    use glam::Vec3;

    #[test]
    fn test_camera_uniform_matches_shader_layout() {
        let program =
            ShaderProgram::from_source("grass_draw", include_str!("../../../shaders/grass_draw.wgsl")).unwrap();
        let layout = program.uniform_layout(0, 0).unwrap();
        assert_eq!(layout.size() as usize, std::mem::size_of::<CameraUniform>());
        assert_eq!(layout.field("position").unwrap().offset, 64);
        assert_eq!(layout.field("time").unwrap().offset, 76);
    }

    #[test]
    fn test_from_camera_copies_position_and_time() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 45.0, 16.0 / 9.0);
        let uniform = CameraUniform::from_camera(&camera, 4.5);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.time, 4.5);
        assert_eq!(uniform.view_proj, camera.view_projection().to_cols_array_2d());
    }
}
