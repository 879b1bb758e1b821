//! G-buffer render targets for deferred grass shading

use wgpu::{Device, Extent3d, Texture, TextureView};

/// Formats of the color targets, in `@location` order
pub const COLOR_FORMATS: [wgpu::TextureFormat; 3] = [
    // rgb = albedo, a = specular strength
    wgpu::TextureFormat::Rgba16Float,
    // xyz = world position, w = 1 where something was drawn
    wgpu::TextureFormat::Rgba16Float,
    // xyz = world normal
    wgpu::TextureFormat::Rgba16Float,
];

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Color target states for pipelines writing the G-buffer
pub fn color_target_states() -> [Option<wgpu::ColorTargetState>; 3] {
    COLOR_FORMATS.map(|format| {
        Some(wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })
    })
}

struct Targets {
    #[allow(dead_code)]
    textures: [Texture; 4],
    color_views: [TextureView; 3],
    depth_view: TextureView,
    read_bind_group: wgpu::BindGroup,
}

/// G-buffer textures for deferred rendering
///
/// - color_spec: albedo + specular strength
/// - position: world position, `w == 0` marks empty pixels
/// - normal: world normal
/// - depth: depth buffer for the geometry pass
pub struct GBuffer {
    targets: Targets,
    /// Layout for reading the color targets in the lighting pass; survives resizes
    read_bind_group_layout: wgpu::BindGroupLayout,
    width: u32,
    height: u32,
}

impl GBuffer {
    /// Create new G-buffer with specified dimensions
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let read_bind_group_layout = Self::create_read_bind_group_layout(device);
        let targets = Self::create_targets(device, &read_bind_group_layout, width, height);
        Self {
            targets,
            read_bind_group_layout,
            width,
            height,
        }
    }

    /// Resize G-buffer to new dimensions
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.targets = Self::create_targets(device, &self.read_bind_group_layout, width, height);
        self.width = width;
        self.height = height;
    }

    pub fn color_views(&self) -> &[TextureView; 3] {
        &self.targets.color_views
    }

    pub fn depth_view(&self) -> &TextureView {
        &self.targets.depth_view
    }

    /// Get bind group layout for reading G-buffer
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.read_bind_group_layout
    }

    /// Get bind group for reading G-buffer
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.targets.read_bind_group
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn create_targets(device: &Device, layout: &wgpu::BindGroupLayout, width: u32, height: u32) -> Targets {
        let size = Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let create = |label: &str, format: wgpu::TextureFormat, usage: wgpu::TextureUsages| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let color_usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let textures = [
            create("gbuffer_color_spec", COLOR_FORMATS[0], color_usage),
            create("gbuffer_position", COLOR_FORMATS[1], color_usage),
            create("gbuffer_normal", COLOR_FORMATS[2], color_usage),
            create("gbuffer_depth", DEPTH_FORMAT, wgpu::TextureUsages::RENDER_ATTACHMENT),
        ];

        let view = |t: &Texture| t.create_view(&wgpu::TextureViewDescriptor::default());
        let color_views = [view(&textures[0]), view(&textures[1]), view(&textures[2])];
        let depth_view = view(&textures[3]);

        let read_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gbuffer_read_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&color_views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&color_views[2]),
                },
            ],
        });

        Targets {
            textures,
            color_views,
            depth_view,
            read_bind_group,
        }
    }

    /// Create bind group layout for reading (texel loads in the lighting pass)
    fn create_read_bind_group_layout(device: &Device) -> wgpu::BindGroupLayout {
        let entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gbuffer_read_bind_group_layout"),
            entries: &[entry(0), entry(1), entry(2)],
        })
    }
}
