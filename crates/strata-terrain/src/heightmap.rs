//! Heightmap loading

use std::path::Path;

use image::RgbaImage;
use strata_core::{Result, StrataError};

/// A grid of 8-bit height samples, row-major with row 0 at the north edge
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightSamples {
    samples: Vec<u8>,
    /// Number of rows
    pub height: u32,
    /// Number of columns
    pub width: u32,
}

impl HeightSamples {
    /// Load a heightmap from any image format the `image` crate decodes.
    ///
    /// Gray pixels keep their value; colored pixels collapse to the length of
    /// their normalized RGB vector, saturated at 255. Alpha is ignored.
    pub fn from_image(path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let samples = Self::from_rgba(&img)?;
        tracing::info!(
            "Opened heightmap '{}': {}x{}",
            path.display(),
            samples.width,
            samples.height
        );
        Ok(samples)
    }

    /// Convert decoded RGBA pixels into samples
    pub fn from_rgba(img: &RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let samples = img
            .pixels()
            .map(|p| luminance(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self::from_raw(samples, height, width)
    }

    /// Create a heightmap from raw row-major samples
    pub fn from_raw(samples: Vec<u8>, height: u32, width: u32) -> Result<Self> {
        if height < 2 || width < 2 {
            return Err(StrataError::InvalidHeightmap(format!(
                "grid must be at least 2x2, got {}x{}",
                width, height
            )));
        }
        let expected = height as usize * width as usize;
        if samples.len() != expected {
            return Err(StrataError::InvalidHeightmap(format!(
                "expected {} samples for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            height,
            width,
        })
    }

    /// Sample at `(row, col)`
    pub fn get(&self, row: u32, col: u32) -> u8 {
        self.samples[(row * self.width + col) as usize]
    }

    /// Raw row-major samples, suitable for an 8-bit texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Collapse an RGB pixel to a single 8-bit intensity
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return r;
    }
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let len = (r * r + g * g + b * b).sqrt();
    (len * 255.0).round().min(255.0) as u8
}
