//! Static file serving and GET dispatch for suffix routes
//!
//! Files are served from the working root or a search directory only when
//! the requested path stays inside one of them. Anything else falls through
//! to the asset root.

use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Redirect, Response},
};
use rview_common::indexer::to_forward_slashes;
use std::path::{Component, Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

use crate::api::{files::list_files, history::get_history};
use crate::{ApiError, AppState};

/// Name of the UI entry page inside the asset root
pub const VIEWER_PAGE: &str = "viewer.html";

/// GET /
pub async fn redirect_to_viewer(State(state): State<AppState>) -> Redirect {
    let target = match state.config.asset_subdir() {
        Some(dir) => format!("/{}/{}", to_forward_slashes(&dir), VIEWER_PAGE),
        None => format!("/{}", VIEWER_PAGE),
    };
    Redirect::temporary(&target)
}

/// Fallback for every request without an exact route
pub async fn serve_fallback(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return ApiError::NotFound(request.uri().path().to_string()).into_response();
    }

    let path = request.uri().path().to_string();
    if path.ends_with("/files.json") {
        return list_files(State(state)).await.into_response();
    }
    if path.ends_with("/history") {
        return get_history(State(state)).await.into_response();
    }

    let decoded = urlencoding::decode(&path)
        .map(|s| s.into_owned())
        .unwrap_or(path);

    if let Some(file) = resolve_allowed(&state, &decoded).await {
        debug!("Serving {}", file.display());
        return match ServeFile::new(file).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        };
    }

    match ServeDir::new(state.config.asset_dir()).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Path of a regular file inside an allow-listed root
///
/// Containment is checked on the requested path itself, which may not name a
/// parent directory. Symbolic links inside a root are followed, matching
/// what the indexer lists.
pub async fn resolve_allowed(state: &AppState, url_path: &str) -> Option<PathBuf> {
    let requested = Path::new(url_path);
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut roots = Vec::new();
    for root in std::iter::once(&state.config.working_root).chain(&state.config.search_dirs) {
        if let Ok(canonical) = tokio::fs::canonicalize(root).await {
            roots.push(canonical);
        }
        roots.push(root.clone());
    }

    let relative = url_path.trim_start_matches('/');
    let mut candidates = vec![state.config.working_root.join(relative)];
    if requested.is_absolute() {
        // Search directories are listed by absolute path
        candidates.push(requested.to_path_buf());
    }

    for candidate in candidates {
        if !roots.iter().any(|root| candidate.starts_with(root)) {
            continue;
        }
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            return Some(candidate);
        }
    }
    None
}
