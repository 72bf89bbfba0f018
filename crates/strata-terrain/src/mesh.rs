//! Terrain vertex generation

use crate::heightmap::HeightSamples;
use crate::strip::generate_indices;
use strata_core::{Result, StrataError, VertexMode};

/// Per-vertex attribute set; a mesh carries exactly one of these
#[derive(Clone, Debug, PartialEq)]
pub enum VertexAttributes {
    /// Gray RGB from the normalized sample
    Color(Vec<[f32; 3]>),
    /// `(col / (width - 1), row / (height - 1))`
    TexCoord(Vec<[f32; 2]>),
}

impl VertexAttributes {
    fn empty(mode: VertexMode) -> Self {
        match mode {
            VertexMode::Color => VertexAttributes::Color(Vec::new()),
            VertexMode::Texture => VertexAttributes::TexCoord(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VertexAttributes::Color(c) => c.len(),
            VertexAttributes::TexCoord(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> VertexMode {
        match self {
            VertexAttributes::Color(_) => VertexMode::Color,
            VertexAttributes::TexCoord(_) => VertexMode::Texture,
        }
    }
}

/// Mesh generation parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshParams {
    /// World distance between adjacent samples
    pub spacing: f32,
    /// Altitude per unit of raw sample value
    pub scale: f32,
    pub mode: VertexMode,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            spacing: 0.01,
            scale: 0.002,
            mode: VertexMode::Color,
        }
    }
}

impl MeshParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing > 0.0) {
            return Err(StrataError::InvalidParameter {
                field: "spacing".into(),
                reason: "must be positive".into(),
                value: self.spacing as f64,
            });
        }
        if !(self.scale >= 0.0) {
            return Err(StrataError::InvalidParameter {
                field: "scale".into(),
                reason: "must not be negative".into(),
                value: self.scale as f64,
            });
        }
        Ok(())
    }
}

/// Heightmap geometry ready for upload: one vertex per sample and a single
/// triangle strip covering the grid
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    /// Grid rows the buffers were generated for
    pub height: u32,
    /// Grid columns the buffers were generated for
    pub width: u32,
    /// X east, Y north, Z altitude; centered on the origin in XY
    pub positions: Vec<[f32; 3]>,
    pub attributes: VertexAttributes,
    /// Triangle-strip indices (`row * width + col`)
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Build a mesh from scratch
    pub fn build(samples: &HeightSamples, params: &MeshParams) -> Self {
        let mut mesh = Self {
            height: 0,
            width: 0,
            positions: Vec::new(),
            attributes: VertexAttributes::empty(params.mode),
            indices: Vec::new(),
        };
        mesh.regenerate(samples, params);
        mesh
    }

    /// Rebuild the buffers in place.
    ///
    /// Vertex data is always regenerated from empty buffers; the strip is
    /// only regenerated when the grid dimensions changed.
    pub fn regenerate(&mut self, samples: &HeightSamples, params: &MeshParams) {
        let dims_changed = self.height != samples.height || self.width != samples.width;

        generate_vertices(samples, params, &mut self.positions, &mut self.attributes);

        if dims_changed || self.indices.is_empty() {
            self.indices = generate_indices(samples.height, samples.width);
            tracing::debug!(
                "Regenerated strip for {}x{} grid: {} indices",
                samples.width,
                samples.height,
                self.indices.len()
            );
        }
        self.height = samples.height;
        self.width = samples.width;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Fill `positions` and `attributes` for every grid cell.
///
/// Both buffers are cleared first; `attributes` switches variant if `mode`
/// differs from what it held.
pub fn generate_vertices(
    samples: &HeightSamples,
    params: &MeshParams,
    positions: &mut Vec<[f32; 3]>,
    attributes: &mut VertexAttributes,
) {
    let (height, width) = (samples.height, samples.width);
    let count = samples.len();
    let spacing = params.spacing;
    let h_offset = (height - 1) as f32 * spacing / 2.0;
    let w_offset = (width - 1) as f32 * spacing / 2.0;

    positions.clear();
    positions.reserve(count);
    if attributes.mode() != params.mode {
        *attributes = VertexAttributes::empty(params.mode);
    }
    match attributes {
        VertexAttributes::Color(c) => {
            c.clear();
            c.reserve(count);
        }
        VertexAttributes::TexCoord(t) => {
            t.clear();
            t.reserve(count);
        }
    }

    for h in 0..height {
        for w in 0..width {
            let sample = samples.get(h, w);
            positions.push([
                spacing * w as f32 - w_offset,
                h_offset - spacing * h as f32,
                sample as f32 * params.scale,
            ]);

            match attributes {
                VertexAttributes::Color(c) => {
                    let v = sample as f32 / 255.0;
                    c.push([v, v, v]);
                }
                VertexAttributes::TexCoord(t) => {
                    t.push([
                        w as f32 / (width - 1) as f32,
                        h as f32 / (height - 1) as f32,
                    ]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(height: u32, width: u32) -> HeightSamples {
        let samples = (0..height * width).map(|i| (i * 7 % 256) as u8).collect();
        HeightSamples::from_raw(samples, height, width).unwrap()
    }

    fn params(mode: VertexMode) -> MeshParams {
        MeshParams {
            spacing: 0.5,
            scale: 0.1,
            mode,
        }
    }

    #[test]
    fn colors_are_normalized_samples() {
        let samples = ramp(4, 5);
        let mesh = TerrainMesh::build(&samples, &params(VertexMode::Color));
        let VertexAttributes::Color(colors) = &mesh.attributes else {
            panic!("expected colors");
        };

        assert_eq!(colors.len(), 20);
        for h in 0..4 {
            for w in 0..5 {
                let v = samples.get(h, w) as f32 / 255.0;
                assert_eq!(colors[(h * 5 + w) as usize], [v, v, v]);
            }
        }
    }

    #[test]
    fn texcoords_span_unit_square() {
        let samples = ramp(3, 5);
        let mesh = TerrainMesh::build(&samples, &params(VertexMode::Texture));
        let VertexAttributes::TexCoord(uvs) = &mesh.attributes else {
            panic!("expected texture coordinates");
        };

        assert_eq!(uvs[0], [0.0, 0.0]);
        assert_eq!(uvs[4], [1.0, 0.0]);
        assert_eq!(uvs[7], [0.5, 0.5]);
        assert_eq!(uvs[14], [1.0, 1.0]);
    }

    #[test]
    fn positions_are_centered_on_origin() {
        for (h, w) in [(2, 2), (3, 4), (5, 3), (6, 7)] {
            let mesh = TerrainMesh::build(&ramp(h, w), &params(VertexMode::Color));
            for row in mesh.positions.chunks(w as usize) {
                let sum_x: f32 = row.iter().map(|p| p[0]).sum();
                assert!(sum_x.abs() < 1e-4, "row x sum {} for {}x{}", sum_x, h, w);
                assert!((row[0][0] + row[w as usize - 1][0]).abs() < 1e-5);
            }
            let first = mesh.positions[0];
            let last = mesh.positions[mesh.positions.len() - 1];
            // row 0 is the north edge
            assert!(first[1] > 0.0);
            assert!((first[1] + last[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn altitude_is_sample_times_scale() {
        let samples = HeightSamples::from_raw(vec![0, 10, 255, 100], 2, 2).unwrap();
        let mesh = TerrainMesh::build(&samples, &params(VertexMode::Color));
        let expected = [0.0, 1.0, 25.5, 10.0];
        for (p, z) in mesh.positions.iter().zip(expected) {
            assert!((p[2] - z).abs() < 1e-5, "altitude {} != {}", p[2], z);
        }
    }

    #[test]
    fn zero_scale_flattens() {
        let mesh = TerrainMesh::build(
            &ramp(4, 4),
            &MeshParams {
                scale: 0.0,
                ..params(VertexMode::Color)
            },
        );
        assert!(mesh.positions.iter().all(|p| p[2] == 0.0));
    }

    #[test]
    fn generation_is_idempotent() {
        let samples = ramp(6, 4);
        let p = params(VertexMode::Color);
        let a = TerrainMesh::build(&samples, &p);
        let mut b = a.clone();
        b.regenerate(&samples, &p);
        assert_eq!(a, b);
    }

    #[test]
    fn regenerating_smaller_grid_leaves_no_stale_data() {
        let p = params(VertexMode::Texture);
        let small = ramp(3, 3);
        let fresh = TerrainMesh::build(&small, &p);

        let mut reused = TerrainMesh::build(&ramp(8, 9), &p);
        reused.regenerate(&small, &p);

        assert_eq!(reused, fresh);
        assert_eq!(reused.vertex_count(), 9);
        assert_eq!(reused.index_count(), 11);
    }

    #[test]
    fn switching_mode_replaces_attributes() {
        let samples = ramp(3, 3);
        let mut mesh = TerrainMesh::build(&samples, &params(VertexMode::Color));
        mesh.regenerate(&samples, &params(VertexMode::Texture));
        assert_eq!(mesh.attributes.mode(), VertexMode::Texture);
        assert_eq!(mesh.attributes.len(), 9);
    }

    #[test]
    fn params_reject_bad_spacing_and_scale() {
        assert!(MeshParams {
            spacing: 0.0,
            ..MeshParams::default()
        }
        .validate()
        .is_err());
        assert!(MeshParams {
            scale: -1.0,
            ..MeshParams::default()
        }
        .validate()
        .is_err());
        assert!(MeshParams::default().validate().is_ok());
    }
}
