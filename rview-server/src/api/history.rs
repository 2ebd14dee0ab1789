//! Grid layout history endpoints

use axum::{extract::State, Json};
use rview_common::history::WriteOutcome;
use rview_common::{Cell, GridLayout};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{ApiResult, AppState};

/// Body of POST /history
#[derive(Debug, Deserialize)]
pub struct SaveHistoryRequest {
    /// Entry to overwrite; anything but an in-range integer prepends
    #[serde(default)]
    pub index: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
}

/// GET */history
///
/// An unreadable history file is logged and served as an empty list.
pub async fn get_history(State(state): State<AppState>) -> ApiResult<Json<Vec<GridLayout>>> {
    let store = state.history.clone();
    let history = tokio::task::spawn_blocking(move || store.read()).await?;
    Ok(Json(history))
}

/// POST /history
pub async fn save_history(
    State(state): State<AppState>,
    Json(request): Json<SaveHistoryRequest>,
) -> ApiResult<Json<Value>> {
    let target_index = request.index.as_ref().and_then(Value::as_i64);
    let entry = GridLayout::new(request.name, request.cols, request.rows, request.cells)?;
    let name = entry.name.clone();

    let store = state.history.clone();
    let outcome = tokio::task::spawn_blocking(move || store.write(entry, target_index)).await??;

    match outcome {
        WriteOutcome::Inserted => info!("Saved new history entry '{}'", name),
        WriteOutcome::Replaced(index) => info!("Replaced history entry {} with '{}'", index, name),
    }

    Ok(Json(json!({ "status": "ok" })))
}
