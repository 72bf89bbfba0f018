//! Fixed-function style backend
//!
//! Mirrors the old client-side vertex array path: the matrix stack is
//! applied on the CPU every frame and the transformed array is streamed to
//! the GPU, which only passes it through.

use crate::backend::{begin_main_pass, create_pipeline, PipelineDesc, RenderBackend, TextureBinding};
use crate::context::{RenderContext, RenderError};
use crate::mesh::{ClipVertex, FrameMatrices, MeshData, Vertex};
use bytemuck::Zeroable;
use glam::{Mat4, Vec3};
use strata_core::BackendKind;
use wgpu::util::DeviceExt;

struct LegacyMesh {
    pipeline: wgpu::RenderPipeline,
    /// Untransformed vertices kept on the CPU
    vertices: Vec<Vertex>,
    /// Per-frame transformed copy, reused between frames
    clip_vertices: Vec<ClipVertex>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    texture: Option<TextureBinding>,
}

/// CPU-transform backend
#[derive(Default)]
pub struct LegacyBackend {
    mesh: Option<LegacyMesh>,
}

impl LegacyBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for LegacyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Legacy
    }

    fn upload(&mut self, ctx: &RenderContext, mesh: &MeshData<'_>) -> Result<(), RenderError> {
        mesh.validate()?;
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Legacy Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("legacy.wgsl").into()),
        });

        let texture = TextureBinding::for_shading(ctx, &mesh.shading);
        let layouts: Vec<&wgpu::BindGroupLayout> = texture.iter().map(|t| &t.layout).collect();

        let pipeline = create_pipeline(
            ctx,
            PipelineDesc {
                label: "Legacy Pipeline",
                shader: &shader,
                vertex_layout: ClipVertex::desc(),
                bind_group_layouts: &layouts,
                textured: texture.is_some(),
                topology: mesh.topology,
            },
        );

        let vertices = mesh.interleave();
        let clip_vertices = vec![ClipVertex::zeroed(); vertices.len()];

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Legacy Vertex Array"),
            size: (clip_vertices.len() * std::mem::size_of::<ClipVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Legacy Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            "Legacy upload: {} vertices, {} indices",
            vertices.len(),
            mesh.indices.len()
        );

        self.mesh = Some(LegacyMesh {
            pipeline,
            vertices,
            clip_vertices,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
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
        let mesh = self.mesh.as_mut().ok_or(RenderError::NothingToDraw)?;

        transform_vertices(&mesh.vertices, &matrices.mvp(), &mut mesh.clip_vertices);
        ctx.queue.write_buffer(
            &mesh.vertex_buffer,
            0,
            bytemuck::cast_slice(&mesh.clip_vertices),
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Legacy Encoder"),
            });
        {
            let mut pass = begin_main_pass(&mut encoder, ctx, target);
            pass.set_pipeline(&mesh.pipeline);
            if let Some(texture) = &mesh.texture {
                pass.set_bind_group(0, &texture.bind_group, &[]);
            }
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

/// Apply `mvp` to every vertex, writing clip-space positions into `out`
pub fn transform_vertices(vertices: &[Vertex], mvp: &Mat4, out: &mut Vec<ClipVertex>) {
    out.clear();
    out.extend(vertices.iter().map(|v| ClipVertex {
        position: (*mvp * Vec3::from_array(v.position).extend(1.0)).to_array(),
        attribute: v.attribute,
    }));
}
