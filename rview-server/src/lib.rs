//! rview-server library
//!
//! Web backend of the research media viewer: live media listing, grid
//! layout history, grid video rendering and static file serving.

use axum::Router;
use rview_common::config::{ViewerConfig, OUTPUT_FILE_STEM};
use rview_common::indexer::{IndexRoot, MediaIndexer};
use rview_common::HistoryStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod compositor;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use compositor::{Compositor, MediaTool};

/// Prefix the UI needs in front of working-root paths (it lives one level down)
pub const WORKING_ROOT_PREFIX: &str = "../";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ViewerConfig>,
    pub history: Arc<HistoryStore>,
    pub compositor: Arc<Compositor>,
    /// Renders share one output file, so only one runs at a time
    pub render_lock: Arc<Mutex<()>>,
    pub indexer: MediaIndexer,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ViewerConfig, tool: Arc<dyn MediaTool>) -> Self {
        let mut indexer = MediaIndexer::new().exclude_matching(OUTPUT_FILE_STEM);
        if let Some(assets) = config.asset_subdir() {
            indexer = indexer.exclude_dir(assets);
        }

        Self {
            history: Arc::new(HistoryStore::new(config.history_path())),
            compositor: Arc::new(Compositor::new(&config, tool)),
            render_lock: Arc::new(Mutex::new(())),
            indexer,
            config: Arc::new(config),
        }
    }

    /// Roots scanned for the live file listing
    pub fn index_roots(&self) -> Vec<IndexRoot> {
        let mut roots = vec![IndexRoot::with_prefix(
            self.config.working_root.clone(),
            WORKING_ROOT_PREFIX,
        )];
        roots.extend(self.config.search_dirs.iter().cloned().map(IndexRoot::qualified));
        roots
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::redirect_to_viewer))
        .route("/history", get(api::get_history).post(api::save_history))
        .route("/render", post(api::render_grid))
        .merge(api::health_routes())
        // `*/files.json`, `*/history` and static files
        .fallback(api::serve_fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
