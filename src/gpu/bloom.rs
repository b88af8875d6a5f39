//! Bloom post-processing.
//!
//! The scene is rendered into an HDR offscreen texture. A bright-pass with a
//! horizontal blur writes into a second texture, then a fullscreen pass blurs
//! that vertically, adds it back over the scene and tonemaps into the surface.

use bytemuck::{Pod, Zeroable};

use super::{DEPTH_FORMAT, HDR_FORMAT};
use crate::config::BloomSettings;

pub(crate) const BLOOM_SHADER: &str = include_str!("bloom.wgsl");

/// Uniforms shared by both bloom passes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct PostUniforms {
    texel: [f32; 2],
    threshold: f32,
    strength: f32,
    radius: f32,
    exposure: f32,
    _pad: [f32; 2],
}

impl PostUniforms {
    pub(crate) fn new(settings: &BloomSettings, width: u32, height: u32) -> Self {
        Self {
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            threshold: settings.threshold,
            strength: settings.strength,
            radius: settings.radius,
            exposure: settings.exposure,
            _pad: [0.0; 2],
        }
    }
}

/// A color texture plus its view.
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(device: &wgpu::Device, label: &str, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// GPU resources for the bloom chain.
pub struct BloomPass {
    settings: BloomSettings,
    hdr: Target,
    depth: Target,
    bright: Target,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bright_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
    bright_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        settings: BloomSettings,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let hdr = Target::new(device, "HDR Scene Texture", HDR_FORMAT, width, height);
        let depth = Target::new(device, "Scene Depth Texture", DEPTH_FORMAT, width, height);
        let bright = Target::new(device, "Bloom Texture", HDR_FORMAT, width, height);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bloom Uniform Buffer"),
            size: std::mem::size_of::<PostUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(3),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let bright_pipeline =
            create_fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_bright", HDR_FORMAT);
        let composite_pipeline =
            create_fullscreen_pipeline(device, &pipeline_layout, &shader, "fs_composite", surface_format);

        // Binding 3 is unused by the bright-pass; the scene stands in for it.
        let bright_bind_group =
            create_bind_group(device, &bind_group_layout, &hdr.view, &sampler, &uniform_buffer, &hdr.view);
        let composite_bind_group =
            create_bind_group(device, &bind_group_layout, &hdr.view, &sampler, &uniform_buffer, &bright.view);

        Self {
            settings,
            hdr,
            depth,
            bright,
            sampler,
            uniform_buffer,
            bind_group_layout,
            bright_bind_group,
            composite_bind_group,
            bright_pipeline,
            composite_pipeline,
        }
    }

    /// Color view the scene pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.hdr.view
    }

    /// Depth view for the scene pass.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    /// Upload the uniforms for the current target size.
    pub fn prepare(&self, queue: &wgpu::Queue) {
        let size = self.hdr.texture.size();
        let uniforms = PostUniforms::new(&self.settings, size.width, size.height);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Recreate textures and bind groups after window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.hdr = Target::new(device, "HDR Scene Texture", HDR_FORMAT, width, height);
        self.depth = Target::new(device, "Scene Depth Texture", DEPTH_FORMAT, width, height);
        self.bright = Target::new(device, "Bloom Texture", HDR_FORMAT, width, height);

        self.bright_bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.hdr.view,
            &self.sampler,
            &self.uniform_buffer,
            &self.hdr.view,
        );
        self.composite_bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.hdr.view,
            &self.sampler,
            &self.uniform_buffer,
            &self.bright.view,
        );
    }

    /// Record both bloom passes, finishing in `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        fullscreen_pass(
            encoder,
            "Bloom Bright Pass",
            &self.bright.view,
            &self.bright_pipeline,
            &self.bright_bind_group,
        );
        fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            output,
            &self.composite_pipeline,
            &self.composite_bind_group,
        );
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    uniforms: &wgpu::Buffer,
    bloom: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(scene),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(bloom),
            },
        ],
    })
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
