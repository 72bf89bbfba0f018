//! Strata Terrain - Heightmap mesh generation
//!
//! Turns a grid of 8-bit height samples into a vertex buffer and a single
//! triangle-strip index buffer. Does not depend on strata-render; outputs
//! raw vertex data (positions, colors or UVs, indices) for a renderer to
//! consume.

pub mod heightmap;
pub mod mesh;
pub mod strip;

pub use heightmap::{luminance, HeightSamples};
pub use mesh::{generate_vertices, MeshParams, TerrainMesh, VertexAttributes};
pub use strip::{generate_indices, strip_index_count, strip_triangle_count, StripWalk};

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::VertexMode;

    #[test]
    fn flat_heightmap_generates_full_strip() {
        let hm = HeightSamples::from_raw(vec![128; 16], 4, 4).unwrap();
        let mesh = TerrainMesh::build(&hm, &MeshParams::default());

        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.index_count(), 16 + 2 * 3);
        assert_eq!(mesh.index_count(), strip_index_count(4, 4));
        assert_eq!(mesh.attributes.mode(), VertexMode::Color);
    }

    #[test]
    fn strip_indices_address_generated_vertices() {
        let hm = HeightSamples::from_raw((0..35).map(|i| i as u8).collect(), 5, 7).unwrap();
        let mesh = TerrainMesh::build(
            &hm,
            &MeshParams {
                mode: VertexMode::Texture,
                ..MeshParams::default()
            },
        );

        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.attributes.len(), mesh.vertex_count());
    }

    #[test]
    fn indices_ignore_sample_values() {
        let a = HeightSamples::from_raw(vec![0; 12], 3, 4).unwrap();
        let b = HeightSamples::from_raw((0..12).map(|i| (i * 20) as u8).collect(), 3, 4).unwrap();
        let params = MeshParams::default();
        assert_eq!(
            TerrainMesh::build(&a, &params).indices,
            TerrainMesh::build(&b, &params).indices
        );
    }
}
