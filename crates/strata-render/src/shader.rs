//! Shader backend: vertices live on the GPU, the transform is a uniform

use crate::backend::{begin_main_pass, create_pipeline, PipelineDesc, RenderBackend, TextureBinding};
use crate::context::{RenderContext, RenderError};
use crate::mesh::{FrameMatrices, MeshData, Vertex};
use bytemuck::{Pod, Zeroable};
use strata_core::BackendKind;
use wgpu::util::DeviceExt;

/// Uniform data (bind group 0, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TransformUniforms {
    pub mvp: [[f32; 4]; 4],
}

struct ShaderMesh {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture: Option<TextureBinding>,
}

/// GPU-transform backend
#[derive(Default)]
pub struct ShaderBackend {
    mesh: Option<ShaderMesh>,
}

impl ShaderBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for ShaderBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Shader
    }

    fn upload(&mut self, ctx: &RenderContext, mesh: &MeshData<'_>) -> Result<(), RenderError> {
        mesh.validate()?;
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Uniform Buffer"),
            contents: bytemuck::cast_slice(&[TransformUniforms::from(&FrameMatrices::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Transform Bind Group"),
        });

        let texture = TextureBinding::for_shading(ctx, &mesh.shading);
        let mut layouts = vec![&uniform_layout];
        if let Some(texture) = &texture {
            layouts.push(&texture.layout);
        }

        let pipeline = create_pipeline(
            ctx,
            PipelineDesc {
                label: "Terrain Pipeline",
                shader: &shader,
                vertex_layout: Vertex::desc(),
                bind_group_layouts: &layouts,
                textured: texture.is_some(),
                topology: mesh.topology,
            },
        );

        let vertices = mesh.interleave();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            "Shader upload: {} vertices, {} indices",
            vertices.len(),
            mesh.indices.len()
        );

        self.mesh = Some(ShaderMesh {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            texture,
        });
        Ok(())
    }

    fn draw(
        &mut self,
        ctx: &RenderContext,
        matrices: &FrameMatrices,
        target: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        let mesh = self.mesh.as_ref().ok_or(RenderError::NothingToDraw)?;

        ctx.queue.write_buffer(
            &mesh.uniform_buffer,
            0,
            bytemuck::cast_slice(&[TransformUniforms::from(matrices)]),
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Shader Encoder"),
            });
        {
            let mut pass = begin_main_pass(&mut encoder, ctx, target);
            pass.set_pipeline(&mesh.pipeline);
            pass.set_bind_group(0, &mesh.uniform_bind_group, &[]);
            if let Some(texture) = &mesh.texture {
                pass.set_bind_group(1, &texture.bind_group, &[]);
            }
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

impl From<&FrameMatrices> for TransformUniforms {
    fn from(matrices: &FrameMatrices) -> Self {
        Self {
            mvp: matrices.mvp().to_cols_array_2d(),
        }
    }
}
