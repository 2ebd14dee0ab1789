//! Caption font lookup

use std::path::{Path, PathBuf};

/// Font file looked for next to the executable
pub const BUNDLED_FONT_NAME: &str = "font.ttf";

/// Well-known system font locations, in preference order
pub const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
];

/// Candidate font paths: configured, bundled, then system
pub fn font_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(BUNDLED_FONT_NAME));
    }
    candidates.extend(SYSTEM_FONTS.iter().map(PathBuf::from));
    candidates
}

/// First candidate that exists as a file
pub fn first_existing<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|p| p.is_file())
}

/// Resolve the caption font, `None` when captions cannot be drawn
pub fn resolve_font(configured: Option<&Path>) -> Option<PathBuf> {
    first_existing(font_candidates(configured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_configured_font_comes_first() {
        let candidates = font_candidates(Some(Path::new("/fonts/mine.ttf")));
        assert_eq!(candidates[0], PathBuf::from("/fonts/mine.ttf"));
        assert!(candidates.ends_with(&SYSTEM_FONTS.iter().map(PathBuf::from).collect::<Vec<_>>()));
    }

    #[test]
    fn test_first_existing_skips_missing() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.ttf");
        std::fs::write(&present, b"font").unwrap();

        let found = first_existing(vec![dir.path().join("missing.ttf"), present.clone()]);
        assert_eq!(found, Some(present));
    }

    #[test]
    fn test_none_when_nothing_exists() {
        assert_eq!(first_existing(vec![PathBuf::from("/nonexistent/a.ttf")]), None);
    }
}
