//! Strata Viewer - heightmap terrain viewer library
//!
//! This crate provides the `ViewerApp` application handler and the
//! scenes it can show: a heightmap terrain or the rotating triangle demo.

pub mod scene;
mod viewer_app;

pub use scene::{HeightmapScene, MeshSummary, Scene};
pub use viewer_app::ViewerApp;
