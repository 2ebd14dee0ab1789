//! # rview Common Library
//!
//! Shared code for the rview binaries:
//! - Error types
//! - Configuration loading
//! - Media classification by extension
//! - Media file indexing
//! - Grid layout history persistence

pub mod config;
pub mod error;
pub mod history;
pub mod indexer;
pub mod media;

pub use error::{Error, Result};
pub use history::{Cell, GridLayout, HistoryStore};
pub use media::MediaKind;
