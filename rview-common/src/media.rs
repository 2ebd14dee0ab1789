//! Media classification
//!
//! Files are classified as image or video purely by extension. No magic byte
//! sniffing: the external tool is the authority on what it can decode.

use std::path::Path;

/// Extensions picked up by the indexer (lowercase, without the dot)
pub const INDEXED_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "png", "jpg", "jpeg"];

/// Kind of media a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image, looped for the target duration when composited
    Image,
    /// Video with its own duration
    Video,
}

impl MediaKind {
    /// Classify an extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(MediaKind::Image),
            "mp4" | "webm" | "mov" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Classify a cell reference for compositing
    ///
    /// Anything that is not a known image is treated as video, so unknown
    /// containers still get probed and handed to ffmpeg as-is.
    pub fn for_render(path: &Path) -> Self {
        match Self::from_path(path) {
            Some(MediaKind::Image) => MediaKind::Image,
            _ => MediaKind::Video,
        }
    }

    pub fn is_image(self) -> bool {
        self == MediaKind::Image
    }
}

/// True if the indexer should report this path
pub fn is_indexed(path: &Path) -> bool {
    MediaKind::from_path(path).is_some()
}
