//! Grid render endpoint

use axum::{extract::State, Json};
use rview_common::config::OUTPUT_FILE_NAME;
use serde::Serialize;
use tracing::{error, info};

use crate::compositor::RenderRequest;
use crate::{ApiError, ApiResult, AppState};

/// Successful render response
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub status: String,
    /// Output file name, relative to the viewer page
    pub file: String,
    /// Duration every cell was held to, in seconds
    pub duration: f64,
}

/// POST /render
///
/// Waits for any render already in progress, then runs ffmpeg on the
/// blocking pool. A failing ffmpeg is reported as RENDER_FAILED.
pub async fn render_grid(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Json<RenderResponse>> {
    let _guard = state.render_lock.lock().await;

    let compositor = state.compositor.clone();
    let result = tokio::task::spawn_blocking(move || compositor.render(&request)).await?;

    match result {
        Ok(output) => {
            info!("Render complete: {}", output.path.display());
            Ok(Json(RenderResponse {
                status: "ok".to_string(),
                file: OUTPUT_FILE_NAME.to_string(),
                duration: output.duration,
            }))
        }
        Err(e) => {
            error!("Render failed: {}", e);
            Err(ApiError::from(e))
        }
    }
}
