//! Strata - heightmap terrain viewer
//!
//! Usage:
//!   strata heightmap <image> [--config <toml>] [--backend legacy|shader] [--mode color|texture]
//!   strata triangle [--backend legacy|shader]
//!   strata info <image>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use strata_core::{BackendKind, StrataConfig, VertexMode};
use strata_terrain::MeshParams;
use strata_viewer::{HeightmapScene, Scene, ViewerApp};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Heightmap terrain viewer with a free-fly camera", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly over a terrain built from a heightmap image
    Heightmap {
        /// Path to the heightmap image
        image: PathBuf,

        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Render backend (legacy or shader)
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Vertex attribute (color or texture)
        #[arg(long)]
        mode: Option<VertexMode>,

        /// Distance between adjacent samples
        #[arg(long)]
        spacing: Option<f32>,

        /// Altitude per unit of sample value
        #[arg(long)]
        scale: Option<f32>,

        /// Launch in fullscreen mode
        #[arg(long)]
        fullscreen: bool,
    },

    /// Spinning RGB triangle
    Triangle {
        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Render backend (legacy or shader)
        #[arg(long)]
        backend: Option<BackendKind>,
    },

    /// Print heightmap and mesh sizes without opening a window
    Info {
        /// Path to the heightmap image
        image: PathBuf,

        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // RUST_LOG controls the level, e.g. RUST_LOG=debug or RUST_LOG=strata_terrain=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Heightmap {
            image,
            config,
            backend,
            mode,
            spacing,
            scale,
            fullscreen,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(backend) = backend {
                config.render.backend = backend;
            }
            if let Some(mode) = mode {
                config.terrain.mode = mode;
            }
            if let Some(spacing) = spacing {
                config.terrain.spacing = spacing;
            }
            if let Some(scale) = scale {
                config.terrain.scale = scale;
            }
            config.window.fullscreen |= fullscreen;
            config.validate().context("Invalid settings")?;

            let terrain = HeightmapScene::load(&image, mesh_params(&config))
                .with_context(|| format!("Failed to load heightmap {}", image.display()))?;

            println!("Loaded heightmap: {}", image.display());
            print_summary(&terrain);
            println!();
            println!("Controls:");
            println!("  Left mouse  - Hold to look");
            println!("  Right mouse - Face start direction");
            println!("  Wheel       - Zoom");
            println!("  WASD        - Move");
            println!("  Space/Shift - Up/Down");
            println!("  M           - Toggle color/texture");
            println!("  Escape      - Exit");

            run(config, Scene::Heightmap(terrain))
        }

        Commands::Triangle { config, backend } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(backend) = backend {
                config.render.backend = backend;
            }
            run(config, Scene::Triangle)
        }

        Commands::Info { image, config } => {
            let config = load_config(config.as_deref())?;
            let terrain = HeightmapScene::load(&image, mesh_params(&config))
                .with_context(|| format!("Failed to load heightmap {}", image.display()))?;
            print_summary(&terrain);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<StrataConfig> {
    match path {
        Some(path) => StrataConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(StrataConfig::default()),
    }
}

fn mesh_params(config: &StrataConfig) -> MeshParams {
    MeshParams {
        spacing: config.terrain.spacing,
        scale: config.terrain.scale,
        mode: config.terrain.mode,
    }
}

fn print_summary(terrain: &HeightmapScene) {
    let summary = terrain.summary();
    println!("Size:      {}x{}", summary.width, summary.height);
    println!("Vertices:  {}", summary.vertices);
    println!("Indices:   {}", summary.indices);
    println!("Triangles: {} (strip)", summary.triangles);
}

fn run(config: StrataConfig, scene: Scene) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, scene);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
