//! Strata Core - Foundational types for the Strata terrain demos
//!
//! This crate provides what every other Strata crate depends on:
//! - `StrataError` and the `Result` alias
//! - `StrataConfig` - TOML configuration for window, terrain, camera and renderer

mod config;
mod error;

pub use config::{
    BackendKind, CameraConfig, RenderConfig, StrataConfig, TerrainConfig, VertexMode,
    WindowConfig,
};
pub use error::{Result, StrataError};
