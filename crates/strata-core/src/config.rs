//! TOML configuration for the viewer, terrain mesh, camera and renderer

use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Top-level configuration file.
///
/// Every table and field is optional; missing values fall back to the
/// defaults the demos were tuned with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub window: WindowConfig,
    pub terrain: TerrainConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

impl StrataConfig {
    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values that would break mesh generation or the camera
    pub fn validate(&self) -> Result<()> {
        if !(self.terrain.spacing > 0.0) {
            return Err(invalid("terrain.spacing", "must be positive", self.terrain.spacing));
        }
        if !(self.terrain.scale >= 0.0) {
            return Err(invalid("terrain.scale", "must not be negative", self.terrain.scale));
        }
        let cam = &self.camera;
        if !(cam.min_fov > 0.0 && cam.min_fov <= cam.max_fov && cam.max_fov < 180.0) {
            return Err(invalid(
                "camera.min_fov",
                "must be positive and not above camera.max_fov (< 180)",
                cam.min_fov,
            ));
        }
        if !(cam.pitch_limit_deg > 0.0 && cam.pitch_limit_deg < 90.0) {
            return Err(invalid(
                "camera.pitch_limit_deg",
                "must be inside (0, 90)",
                cam.pitch_limit_deg,
            ));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid("camera.near", "must be positive and below camera.far", cam.near));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str, value: f32) -> StrataError {
    StrataError::InvalidParameter {
        field: field.to_string(),
        reason: reason.to_string(),
        value: value as f64,
    }
}

/// Window creation options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Cap the frame rate at the display refresh
    pub vsync: bool,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Strata".to_string(),
            width: 640,
            height: 480,
            vsync: true,
            fullscreen: false,
        }
    }
}

/// Which per-vertex attribute the terrain mesh carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexMode {
    /// Gray color from the normalized sample
    #[default]
    Color,
    /// Texture coordinate over the whole grid
    Texture,
}

impl FromStr for VertexMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(VertexMode::Color),
            "texture" | "tex" => Ok(VertexMode::Texture),
            other => Err(format!("unknown vertex mode '{}' (expected color or texture)", other)),
        }
    }
}

impl fmt::Display for VertexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexMode::Color => write!(f, "color"),
            VertexMode::Texture => write!(f, "texture"),
        }
    }
}

/// Terrain mesh generation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World-space distance between adjacent samples
    pub spacing: f32,
    /// Altitude per unit of raw sample value (0-255)
    pub scale: f32,
    pub mode: VertexMode,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            spacing: 0.01,
            scale: 0.002,
            mode: VertexMode::Color,
        }
    }
}

/// Free camera tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Start position (X east, Y north, Z altitude)
    pub position: [f32; 3],
    /// Start facing; also the direction a snap returns to
    pub direction: [f32; 3],
    /// Initial field of view in degrees
    pub fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,
    /// Degrees of fov removed per scroll notch
    pub zoom_step: f32,
    /// Degrees of rotation per pointer pixel
    pub sensitivity: f32,
    /// World units per second
    pub speed: f32,
    pub near: f32,
    pub far: f32,
    /// Symmetric pitch clamp in degrees
    pub pitch_limit_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            direction: [0.0, 1.0, 0.0],
            fov: 60.0,
            min_fov: 10.0,
            max_fov: 60.0,
            zoom_step: 2.5,
            sensitivity: 0.25,
            speed: 4.0,
            near: 0.1,
            far: 100.0,
            pitch_limit_deg: 89.0,
        }
    }
}

/// Render backend selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CPU-transformed vertex arrays, the fixed-function analog
    Legacy,
    /// GPU transform from a uniform matrix
    #[default]
    Shader,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "gl1" => Ok(BackendKind::Legacy),
            "shader" | "gl2" => Ok(BackendKind::Shader),
            other => Err(format!("unknown backend '{}' (expected legacy or shader)", other)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Legacy => write!(f, "legacy"),
            BackendKind::Shader => write!(f, "shader"),
        }
    }
}

/// Renderer options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub backend: BackendKind,
    /// Frames between average-FPS log lines
    pub fps_report_interval: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Shader,
            fps_report_interval: 100,
        }
    }
}
