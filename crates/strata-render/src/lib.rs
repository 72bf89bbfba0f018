//! Strata Render - wgpu-based renderer for terrain meshes
//!
//! Two interchangeable backends draw the same mesh description: the legacy
//! backend transforms vertices on the CPU every frame, the shader backend
//! uploads geometry once and applies the transform in a vertex shader.

mod backend;
mod context;
mod legacy;
mod mesh;
mod shader;

pub use backend::{create_backend, RenderBackend};
pub use context::{RenderContext, RenderError, CLEAR_COLOR, DEPTH_FORMAT};
pub use legacy::{transform_vertices, LegacyBackend};
pub use mesh::{ClipVertex, FrameMatrices, MeshData, Shading, Topology, Vertex};
pub use shader::{ShaderBackend, TransformUniforms};
