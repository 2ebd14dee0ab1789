//! Error types for rview-server
//!
//! API errors render as `{ "error": { "code", "message" } }`; render
//! failures additionally carry the tool's exit code and stderr tail and a
//! top-level `"status": "error"` the UI keys on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::compositor::{RenderError, ToolError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The composition tool failed (500)
    #[error("Render failed: {message}")]
    RenderFailed {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// rview-common error
    #[error("Common error: {0}")]
    Common(#[from] rview_common::Error),
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            RenderError::Io(e) => ApiError::Internal(format!("cannot prepare render output: {}", e)),
            RenderError::Tool(ToolError::Failed {
                program,
                exit_code,
                stderr,
            }) => ApiError::RenderFailed {
                message: format!("{} exited unsuccessfully", program),
                exit_code,
                stderr,
            },
            RenderError::Tool(other) => ApiError::RenderFailed {
                message: other.to_string(),
                exit_code: None,
                stderr: String::new(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::RenderFailed {
                message,
                exit_code,
                stderr,
            } => {
                let body = Json(json!({
                    "status": "error",
                    "error": {
                        "code": "RENDER_FAILED",
                        "message": message,
                        "exit_code": exit_code,
                        "stderr": stderr,
                    }
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(rview_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "status": "error",
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
