//! Backend-independent description of what to draw

use crate::context::RenderError;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use strata_terrain::{HeightSamples, TerrainMesh, VertexAttributes};

/// Primitive assembly for the index buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleStrip,
    TriangleList,
}

impl Topology {
    pub(crate) fn primitive_state(self) -> wgpu::PrimitiveState {
        let (topology, strip_index_format) = match self {
            Topology::TriangleStrip => (
                wgpu::PrimitiveTopology::TriangleStrip,
                Some(wgpu::IndexFormat::Uint32),
            ),
            Topology::TriangleList => (wgpu::PrimitiveTopology::TriangleList, None),
        };
        wgpu::PrimitiveState {
            topology,
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }
}

/// How fragments get their color
#[derive(Clone, Copy, Debug)]
pub enum Shading<'a> {
    /// Per-vertex RGB
    Color(&'a [[f32; 3]]),
    /// Per-vertex UVs into a single-channel texture shown as gray
    Texture {
        uvs: &'a [[f32; 2]],
        texels: &'a [u8],
        width: u32,
        height: u32,
    },
}

impl Shading<'_> {
    pub fn is_textured(&self) -> bool {
        matches!(self, Shading::Texture { .. })
    }
}

/// Vertex and index data handed to a backend, borrowed from its owner
#[derive(Clone, Copy, Debug)]
pub struct MeshData<'a> {
    pub positions: &'a [[f32; 3]],
    pub shading: Shading<'a>,
    pub indices: &'a [u32],
    pub topology: Topology,
}

impl<'a> MeshData<'a> {
    /// Describe a terrain mesh; texture mode samples the heightmap itself
    pub fn from_terrain(mesh: &'a TerrainMesh, samples: &'a HeightSamples) -> Self {
        let shading = match &mesh.attributes {
            VertexAttributes::Color(colors) => Shading::Color(colors),
            VertexAttributes::TexCoord(uvs) => Shading::Texture {
                uvs,
                texels: samples.as_bytes(),
                width: samples.width,
                height: samples.height,
            },
        };
        Self {
            positions: &mesh.positions,
            shading,
            indices: &mesh.indices,
            topology: Topology::TriangleStrip,
        }
    }

    /// Check that attributes line up with positions and indices stay in range
    pub fn validate(&self) -> Result<(), RenderError> {
        let count = self.positions.len();
        if count == 0 || self.indices.len() < 3 {
            return Err(RenderError::InvalidMesh(format!(
                "need vertices and at least 3 indices, got {} and {}",
                count,
                self.indices.len()
            )));
        }

        match self.shading {
            Shading::Color(colors) if colors.len() != count => {
                return Err(RenderError::InvalidMesh(format!(
                    "{} colors for {} positions",
                    colors.len(),
                    count
                )));
            }
            Shading::Texture { uvs, .. } if uvs.len() != count => {
                return Err(RenderError::InvalidMesh(format!(
                    "{} texture coordinates for {} positions",
                    uvs.len(),
                    count
                )));
            }
            Shading::Texture {
                texels,
                width,
                height,
                ..
            } if width == 0 || height == 0 || texels.len() != (width * height) as usize => {
                return Err(RenderError::InvalidMesh(format!(
                    "{} texels for a {}x{} texture",
                    texels.len(),
                    width,
                    height
                )));
            }
            _ => {}
        }

        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(RenderError::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }

    /// Interleave positions with the shading attribute.
    /// UVs occupy the first two attribute components.
    pub fn interleave(&self) -> Vec<Vertex> {
        match self.shading {
            Shading::Color(colors) => self
                .positions
                .iter()
                .zip(colors)
                .map(|(&position, &color)| Vertex {
                    position,
                    attribute: color,
                })
                .collect(),
            Shading::Texture { uvs, .. } => self
                .positions
                .iter()
                .zip(uvs)
                .map(|(&position, &[u, v])| Vertex {
                    position,
                    attribute: [u, v, 0.0],
                })
                .collect(),
        }
    }
}

/// Model, view and projection for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for FrameMatrices {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl FrameMatrices {
    /// `projection * view * model`
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

/// World-space vertex: position plus color or UV
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub attribute: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Vertex already transformed to clip space on the CPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ClipVertex {
    pub position: [f32; 4],
    pub attribute: [f32; 3],
}

impl ClipVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ClipVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}
