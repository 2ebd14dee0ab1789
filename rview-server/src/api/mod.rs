//! HTTP API handlers for rview-server

pub mod files;
pub mod health;
pub mod history;
pub mod render;
pub mod static_files;

pub use files::list_files;
pub use health::health_routes;
pub use history::{get_history, save_history};
pub use render::render_grid;
pub use static_files::{redirect_to_viewer, serve_fallback};
