//! Common error types for rview

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for rview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the rview crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// History file exists but cannot be parsed
    #[error("Corrupt history file {path}: {reason}")]
    CorruptHistory { path: PathBuf, reason: String },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
