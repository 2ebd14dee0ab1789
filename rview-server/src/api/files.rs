//! Live media listing

use axum::{extract::State, Json};
use tracing::debug;

use crate::{ApiResult, AppState};

/// GET */files.json
///
/// Rescans the working root and search directories on every call.
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let roots = state.index_roots();
    let indexer = state.indexer.clone();

    let files = tokio::task::spawn_blocking(move || indexer.scan_all(&roots)).await?;
    debug!("Listing {} media files", files.len());
    Ok(Json(files))
}
