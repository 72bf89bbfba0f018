//! What the viewer draws: a heightmap terrain or the spinning triangle

use glam::Mat4;
use std::path::Path;
use strata_core::{Result, VertexMode};
use strata_render::{FrameMatrices, MeshData, Shading, Topology};
use strata_runtime::CameraFrame;
use strata_terrain::{strip_triangle_count, HeightSamples, MeshParams, TerrainMesh};

const TRIANGLE_POSITIONS: [[f32; 3]; 3] = [[-0.6, -0.4, 0.0], [0.6, -0.4, 0.0], [0.0, 0.6, 0.0]];
const TRIANGLE_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// Terrain built from one heightmap image
pub struct HeightmapScene {
    pub samples: HeightSamples,
    pub params: MeshParams,
    pub mesh: TerrainMesh,
}

impl HeightmapScene {
    pub fn load(path: &Path, params: MeshParams) -> Result<Self> {
        params.validate()?;
        let samples = HeightSamples::from_image(path)?;
        Ok(Self::from_samples(samples, params))
    }

    pub fn from_samples(samples: HeightSamples, params: MeshParams) -> Self {
        let mesh = TerrainMesh::build(&samples, &params);
        tracing::info!(
            "Terrain mesh: {} vertices, {} strip indices ({} mode)",
            mesh.vertex_count(),
            mesh.index_count(),
            params.mode
        );
        Self {
            samples,
            params,
            mesh,
        }
    }

    /// Switch between gray colors and texture coordinates, reusing buffers
    pub fn toggle_mode(&mut self) -> VertexMode {
        self.params.mode = match self.params.mode {
            VertexMode::Color => VertexMode::Texture,
            VertexMode::Texture => VertexMode::Color,
        };
        self.mesh.regenerate(&self.samples, &self.params);
        self.params.mode
    }

    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            width: self.samples.width,
            height: self.samples.height,
            vertices: self.mesh.vertex_count(),
            indices: self.mesh.index_count(),
            triangles: strip_triangle_count(self.mesh.index_count()),
        }
    }
}

/// Sizes reported by `strata info`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshSummary {
    pub width: u32,
    pub height: u32,
    pub vertices: usize,
    pub indices: usize,
    /// Strip triangles, degenerate ones included
    pub triangles: usize,
}

pub enum Scene {
    Heightmap(HeightmapScene),
    Triangle,
}

impl Scene {
    /// Whether mouse look and movement keys apply
    pub fn uses_camera(&self) -> bool {
        matches!(self, Scene::Heightmap(_))
    }

    pub fn mesh_data(&self) -> MeshData<'_> {
        match self {
            Scene::Heightmap(terrain) => MeshData::from_terrain(&terrain.mesh, &terrain.samples),
            Scene::Triangle => MeshData {
                positions: &TRIANGLE_POSITIONS,
                shading: Shading::Color(&TRIANGLE_COLORS),
                indices: &TRIANGLE_INDICES,
                topology: Topology::TriangleList,
            },
        }
    }

    /// Matrices for one frame. The triangle ignores the camera and spins
    /// about Z by `total_time` radians.
    pub fn matrices(&self, camera: &CameraFrame, total_time: f64, aspect: f32) -> FrameMatrices {
        match self {
            Scene::Heightmap(_) => FrameMatrices {
                model: Mat4::IDENTITY,
                view: camera.view,
                projection: camera.projection,
            },
            Scene::Triangle => FrameMatrices {
                model: Mat4::from_rotation_z(total_time as f32),
                view: Mat4::IDENTITY,
                projection: Mat4::orthographic_rh(-aspect, aspect, -1.0, 1.0, -1.0, 1.0),
            },
        }
    }
}
