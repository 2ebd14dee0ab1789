//! Grid compositor
//!
//! Turns a grid of cells into one video: probes video durations, holds
//! images and placeholders for the longest one, scales and labels every
//! cell, tiles them row-major and encodes to the fixed output path.
//!
//! Everything here blocks on subprocesses; callers in async context run it
//! on the blocking pool.

pub mod command;
pub mod escape;
pub mod font;
pub mod layout;
pub mod tool;

pub use tool::{FfmpegTool, MediaTool, ToolError};

use rview_common::config::{RenderSettings, ViewerConfig};
use rview_common::history::check_grid_shape;
use rview_common::{Cell, MediaKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use command::{render_args, CellInput, PlannedCell};
use layout::resolve_target_duration;

/// Prefix the UI puts in front of working-root paths
const UI_RELATIVE_PREFIX: &str = "../";

/// Body of a render request
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
}

/// Render failure
#[derive(Debug, Error)]
pub enum RenderError {
    /// Grid shape does not match the cell list
    #[error("invalid render request: {0}")]
    InvalidRequest(String),

    /// Output directory could not be prepared
    #[error("cannot prepare output: {0}")]
    Io(#[from] std::io::Error),

    /// The composition tool failed
    #[error("composition failed: {0}")]
    Tool(#[from] ToolError),
}

/// Result of a successful render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub path: PathBuf,
    /// Duration every cell was held to, in seconds
    pub duration: f64,
}

/// Grid compositor bound to one output path and tool backend
#[derive(Clone)]
pub struct Compositor {
    settings: RenderSettings,
    working_root: PathBuf,
    output_path: PathBuf,
    font_path: Option<PathBuf>,
    tool: Arc<dyn MediaTool>,
}

impl Compositor {
    pub fn new(config: &ViewerConfig, tool: Arc<dyn MediaTool>) -> Self {
        Self {
            settings: config.render.clone(),
            working_root: config.working_root.clone(),
            output_path: config.output_path(),
            font_path: config.font_path.clone(),
            tool,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Map a UI cell reference to a filesystem path
    ///
    /// The UI lists working-root files as `../<path>`; that prefix is
    /// dropped. Absolute paths (search directories) are used as-is.
    pub fn resolve_source(&self, source: &str) -> PathBuf {
        let trimmed = source.strip_prefix(UI_RELATIVE_PREFIX).unwrap_or(source);
        let path = Path::new(trimmed);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_root.join(path)
        }
    }

    /// Classify every cell, in order
    pub fn plan_cells(&self, cells: &[Cell]) -> Vec<PlannedCell> {
        cells
            .iter()
            .map(|cell| {
                let input = match cell.source() {
                    None => CellInput::Placeholder,
                    Some(source) => {
                        let path = self.resolve_source(source);
                        match MediaKind::for_render(&path) {
                            MediaKind::Image => CellInput::Image(path),
                            MediaKind::Video => CellInput::Video(path),
                        }
                    }
                };
                PlannedCell {
                    input,
                    caption: cell.caption.clone(),
                }
            })
            .collect()
    }

    /// Longest video duration among the cells, floored at the minimum
    ///
    /// A failed probe is logged and contributes nothing.
    pub fn target_duration(&self, cells: &[PlannedCell]) -> f64 {
        let probed = cells.iter().filter_map(|cell| match &cell.input {
            CellInput::Video(path) => match self.tool.probe_duration(path) {
                Ok(seconds) => Some(seconds),
                Err(e) => {
                    warn!("Could not probe {}: {}", path.display(), e);
                    None
                }
            },
            _ => None,
        });
        resolve_target_duration(probed, self.settings.min_duration)
    }

    /// Build the complete ffmpeg argument list for a request
    pub fn build_args(&self, request: &RenderRequest) -> Result<(Vec<String>, f64), RenderError> {
        if self.settings.canvas_size(request.cols, request.rows).is_none() {
            return Err(RenderError::InvalidRequest(format!(
                "a {}x{} grid exceeds the maximum canvas size",
                request.cols, request.rows
            )));
        }
        check_grid_shape(request.cols, request.rows, request.cells.len())
            .map_err(|e| RenderError::InvalidRequest(e.to_string()))?;

        let cells = self.plan_cells(&request.cells);
        let duration = self.target_duration(&cells);
        info!("Target duration set to {:.3} seconds", duration);

        let font = font::resolve_font(self.font_path.as_deref());
        if font.is_none() && cells.iter().any(|c| !c.caption.trim().is_empty()) {
            warn!("No caption font found, rendering without captions");
        }

        let args = render_args(
            request.cols,
            request.rows,
            &cells,
            duration,
            &self.settings,
            font.as_deref(),
            &self.output_path,
        );
        Ok((args, duration))
    }

    /// Render the grid, overwriting the previous output
    pub fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let (args, duration) = self.build_args(request)?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!(
            "Rendering {}x{} grid to {}",
            request.cols,
            request.rows,
            self.output_path.display()
        );
        self.tool.compose(&args)?;

        Ok(RenderOutput {
            path: self.output_path.clone(),
            duration,
        })
    }
}
