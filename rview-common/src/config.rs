//! Configuration loading
//!
//! Resolution priority for the config file:
//! 1. Explicit path (command-line argument)
//! 2. `RVIEW_CONFIG` environment variable
//! 3. `rview.toml` in the current directory
//! 4. `<user config dir>/rview/config.toml`
//!
//! A missing file falls back to compiled defaults. A file that exists but
//! does not parse is an error. Command-line overrides are applied on top by
//! the binaries.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RVIEW_CONFIG";
/// Config file looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "rview.toml";
/// History file, inside the asset root
pub const HISTORY_FILE_NAME: &str = "history.json";
/// Render output, inside the asset root
pub const OUTPUT_FILE_NAME: &str = "grid_output.mp4";
/// Substring identifying generated render output in listings
pub const OUTPUT_FILE_STEM: &str = "grid_output";

fn default_port() -> u16 {
    9000
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

/// Geometry and encoding parameters for grid renders
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Width of the video region of one cell
    pub cell_width: u32,
    /// Height of the video region of one cell
    pub cell_height: u32,
    /// Height of the caption band below the video region
    pub caption_height: u32,
    pub font_size: u32,
    pub fps: u32,
    /// Floor for the target duration, in seconds
    pub min_duration: f64,
    pub video_codec: String,
    pub crf: u32,
    pub pixel_format: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cell_width: 1280,
            cell_height: 720,
            caption_height: 80,
            font_size: 40,
            fps: 30,
            min_duration: 5.0,
            video_codec: "libx264".to_string(),
            crf: 20,
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl RenderSettings {
    /// Full height of one cell including its caption band
    pub fn total_cell_height(&self) -> u32 {
        self.cell_height + self.caption_height
    }

    /// Pixel size of a `cols` x `rows` canvas, `None` if it does not fit in `u32`
    pub fn canvas_size(&self, cols: u32, rows: u32) -> Option<(u32, u32)> {
        let tile_height = self.cell_height.checked_add(self.caption_height)?;
        Some((
            cols.checked_mul(self.cell_width)?,
            rows.checked_mul(tile_height)?,
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(Error::Config("render cell size must be non-zero".to_string()));
        }
        if self.canvas_size(1, 1).is_none() {
            return Err(Error::Config(format!(
                "render cell height {} plus caption height {} is too large",
                self.cell_height, self.caption_height
            )));
        }
        if self.fps == 0 {
            return Err(Error::Config("render fps must be non-zero".to_string()));
        }
        if !(self.min_duration.is_finite() && self.min_duration > 0.0) {
            return Err(Error::Config(format!(
                "render min_duration must be positive, got {}",
                self.min_duration
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Directory scanned for media and served as static files
    pub working_root: PathBuf,

    /// UI asset directory; relative paths are taken from `working_root`
    pub asset_root: PathBuf,

    /// Additional allow-listed directories scanned for media
    pub search_dirs: Vec<PathBuf>,

    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,

    /// Caption font; when unset the bundled and system fonts are tried
    pub font_path: Option<PathBuf>,

    pub render: RenderSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_host: default_bind_host(),
            working_root: PathBuf::from("."),
            asset_root: PathBuf::from("viewer"),
            search_dirs: Vec::new(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            font_path: None,
            render: RenderSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve and load the config file, or fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match locate_config_file(explicit)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_file(&path)
            }
            None => {
                info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()
    }

    /// Asset directory as a path usable from the process working directory
    pub fn asset_dir(&self) -> PathBuf {
        if self.asset_root.is_absolute() {
            self.asset_root.clone()
        } else {
            self.working_root.join(&self.asset_root)
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.asset_dir().join(HISTORY_FILE_NAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.asset_dir().join(OUTPUT_FILE_NAME)
    }

    /// Asset root relative to the working root, when it lies inside it
    pub fn asset_subdir(&self) -> Option<PathBuf> {
        if self.asset_root.is_relative() {
            return Some(self.asset_root.clone());
        }
        let root = self.working_root.canonicalize().ok()?;
        let assets = self.asset_root.canonicalize().ok()?;
        assets.strip_prefix(&root).ok().map(Path::to_path_buf)
    }
}

/// Find the config file following the documented priority
///
/// An explicitly named file (argument or environment) must exist; the
/// implicit locations are optional.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = named {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    let user = dirs::config_dir().map(|d| d.join("rview").join("config.toml"));
    Ok(user.filter(|p| p.is_file()))
}
