//! Render backend abstraction and the pieces both backends share

use crate::context::{RenderContext, RenderError, CLEAR_COLOR, DEPTH_FORMAT};
use crate::legacy::LegacyBackend;
use crate::mesh::{FrameMatrices, MeshData, Shading, Topology};
use crate::shader::ShaderBackend;
use strata_core::BackendKind;

/// A way of getting uploaded mesh data onto the screen
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    /// Replace the current mesh. Validates the data first.
    fn upload(&mut self, ctx: &RenderContext, mesh: &MeshData<'_>) -> Result<(), RenderError>;

    /// Record and submit one frame into `target`
    fn draw(
        &mut self,
        ctx: &RenderContext,
        matrices: &FrameMatrices,
        target: &wgpu::TextureView,
    ) -> Result<(), RenderError>;
}

/// Create the backend selected in the configuration
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    tracing::info!("Render backend: {}", kind);
    match kind {
        BackendKind::Legacy => Box::new(LegacyBackend::new()),
        BackendKind::Shader => Box::new(ShaderBackend::new()),
    }
}

/// Height texture plus the bind group that exposes it to `fs_texture`
pub(crate) struct TextureBinding {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl TextureBinding {
    /// Upload single-channel texels as an `R8Unorm` texture
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Height Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Height Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Height Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("Height Texture Bind Group"),
        });

        Self { layout, bind_group }
    }

    /// Build the texture binding when the mesh is textured
    pub fn for_shading(ctx: &RenderContext, shading: &Shading<'_>) -> Option<Self> {
        match *shading {
            Shading::Texture {
                texels,
                width,
                height,
                ..
            } => Some(Self::new(&ctx.device, &ctx.queue, texels, width, height)),
            Shading::Color(_) => None,
        }
    }
}

/// Inputs for a backend pipeline; only the vertex stage and bind groups differ
pub(crate) struct PipelineDesc<'a> {
    pub label: &'a str,
    pub shader: &'a wgpu::ShaderModule,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub textured: bool,
    pub topology: Topology,
}

pub(crate) fn create_pipeline(ctx: &RenderContext, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    let device = &ctx.device;
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{} Layout", desc.label)),
        bind_group_layouts: desc.bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[desc.vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some(if desc.textured { "fs_texture" } else { "fs_color" }),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format(),
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: desc.topology.primitive_state(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Open the main pass: clear color and depth, ready for one indexed draw
pub(crate) fn begin_main_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    ctx: &RenderContext,
    target: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Main Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &ctx.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}
