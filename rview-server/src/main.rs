//! rview-server - Research media viewer backend
//!
//! Serves the grid viewer UI, lists media files, persists grid layout
//! history and renders grid videos through ffmpeg.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rview_common::config::ViewerConfig;
use rview_server::compositor::FfmpegTool;
use rview_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rview-server
#[derive(Parser, Debug)]
#[command(name = "rview-server")]
#[command(about = "Research media viewer: grid arrangement, history and rendering")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "RVIEW_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "RVIEW_BIND_HOST")]
    bind_host: Option<String>,

    /// Working root scanned for media and served as static files
    #[arg(short, long, env = "RVIEW_ROOT")]
    root: Option<PathBuf>,

    /// UI asset directory (relative paths are taken from the working root)
    #[arg(short, long, env = "RVIEW_ASSET_ROOT")]
    asset_root: Option<PathBuf>,

    /// Additional media directory (repeatable)
    #[arg(short, long = "search-dir")]
    search_dirs: Vec<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "RVIEW_FFMPEG")]
    ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, env = "RVIEW_FFPROBE")]
    ffprobe: Option<PathBuf>,

    /// Caption font file
    #[arg(long, env = "RVIEW_FONT")]
    font: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the file configuration
    fn apply(self, mut config: ViewerConfig) -> ViewerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.bind_host {
            config.bind_host = host;
        }
        if let Some(root) = self.root {
            config.working_root = root;
        }
        if let Some(assets) = self.asset_root {
            config.asset_root = assets;
        }
        config.search_dirs.extend(self.search_dirs);
        if let Some(ffmpeg) = self.ffmpeg {
            config.ffmpeg_path = ffmpeg;
        }
        if let Some(ffprobe) = self.ffprobe {
            config.ffprobe_path = ffprobe;
        }
        if self.font.is_some() {
            config.font_path = self.font;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rview_server=info,rview_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting rview-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let file_config = ViewerConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = args.apply(file_config);
    config.validate().context("Invalid configuration")?;

    info!("Working root: {}", config.working_root.display());
    info!("Asset root: {}", config.asset_dir().display());
    for dir in &config.search_dirs {
        if dir.is_dir() {
            info!("Search directory: {}", dir.display());
        } else {
            warn!("Search directory {} does not exist, it will list nothing", dir.display());
        }
    }

    let addr = format!("{}:{}", config.bind_host, config.port);
    let viewer_url = format!("http://{}/", addr);

    let tool = Arc::new(FfmpegTool::new(&config.ffmpeg_path, &config.ffprobe_path));
    let state = AppState::new(config, tool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Research viewer running on {}", viewer_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
