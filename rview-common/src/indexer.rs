//! Media file indexer
//!
//! Recursive discovery of media files under one or more roots. Results are
//! forward-slash paths, sorted lexicographically and de-duplicated across
//! roots. A missing or unreadable root contributes nothing; unreadable
//! entries are logged and skipped.
//!
//! Symbolic links are followed, so linked files and linked dataset folders
//! are reported under the link's own path. A link back to one of its own
//! ancestors is reported as a loop and not descended into.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::media;

/// A directory to scan and the prefix reported in front of each hit
#[derive(Debug, Clone)]
pub struct IndexRoot {
    pub path: PathBuf,
    /// Prepended verbatim to the root-relative path of every hit
    pub prefix: String,
}

impl IndexRoot {
    /// Root whose hits are reported relative to it, without prefix
    pub fn relative(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefix: String::new(),
        }
    }

    /// Root whose hits carry the given prefix (e.g. `../`)
    pub fn with_prefix(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
        }
    }

    /// Root whose hits are reported as `<root>/<relative path>`
    pub fn qualified(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut prefix = to_forward_slashes(&path);
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { path, prefix }
    }
}

/// Media file indexer
#[derive(Debug, Clone)]
pub struct MediaIndexer {
    /// Hits whose reported path contains any of these are dropped
    exclude_substrings: Vec<String>,
    /// Root-relative directories that are never descended into
    exclude_dirs: Vec<PathBuf>,
}

impl MediaIndexer {
    /// Create an indexer with no exclusions
    pub fn new() -> Self {
        Self {
            exclude_substrings: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Drop hits whose path contains `pattern` (generated artifacts)
    pub fn exclude_matching(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_substrings.push(pattern.into());
        self
    }

    /// Skip a root-relative subtree (the viewer's own assets)
    pub fn exclude_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !dir.as_os_str().is_empty() {
            self.exclude_dirs.push(dir);
        }
        self
    }

    /// Scan a single root
    pub fn scan(&self, root: &IndexRoot) -> Vec<String> {
        let mut hits = BTreeSet::new();
        self.collect_into(root, &mut hits);
        hits.into_iter().collect()
    }

    /// Scan every root and merge the hits
    pub fn scan_all(&self, roots: &[IndexRoot]) -> Vec<String> {
        let mut hits = BTreeSet::new();
        for root in roots {
            self.collect_into(root, &mut hits);
        }
        hits.into_iter().collect()
    }

    fn collect_into(&self, root: &IndexRoot, hits: &mut BTreeSet<String>) {
        if !root.path.is_dir() {
            debug!("Index root {} is not a directory, skipping", root.path.display());
            return;
        }

        let walker = WalkDir::new(&root.path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| self.should_descend(&root.path, e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !media::is_indexed(entry.path()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root.path) else {
                continue;
            };
            let reported = format!("{}{}", root.prefix, to_forward_slashes(relative));

            if self.exclude_substrings.iter().any(|p| reported.contains(p.as_str())) {
                continue;
            }
            hits.insert(reported);
        }
    }

    fn should_descend(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        // Hidden files and directories are skipped, as shell globbing does
        if entry.file_name().to_string_lossy().starts_with('.') {
            return false;
        }

        if entry.file_type().is_dir() {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                if self.exclude_dirs.iter().any(|d| relative.starts_with(d)) {
                    return false;
                }
            }
        }

        true
    }
}

impl Default for MediaIndexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Join path components with `/` regardless of host convention
pub fn to_forward_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_filters_by_extension_and_sorts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/clip.mp4");
        touch(dir.path(), "a/still.PNG");
        touch(dir.path(), "a/notes.txt");
        touch(dir.path(), "a/deep/er/x.webm");
        touch(dir.path(), "page.html");
        touch(dir.path(), "z.jpeg");

        let hits = MediaIndexer::new().scan(&IndexRoot::relative(dir.path()));
        assert_eq!(
            hits,
            vec!["a/deep/er/x.webm", "a/still.PNG", "b/clip.mp4", "z.jpeg"]
        );
    }

    #[test]
    fn test_missing_root_contributes_nothing() {
        let hits = MediaIndexer::new().scan(&IndexRoot::relative("/nonexistent/rview/path"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_overlapping_roots_do_not_duplicate() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "clips/one.mov");

        let root = IndexRoot::qualified(dir.path());
        let hits = MediaIndexer::new().scan_all(&[root.clone(), root]);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with("/clips/one.mov"));
    }

    #[test]
    fn test_exclusions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "viewer/grid_output.mp4");
        touch(dir.path(), "viewer/thumb.png");
        touch(dir.path(), "old/grid_output.mp4");
        touch(dir.path(), "keep/me.mp4");
        touch(dir.path(), ".cache/hidden.mp4");

        let indexer = MediaIndexer::new()
            .exclude_matching("grid_output")
            .exclude_dir("viewer");
        let hits = indexer.scan(&IndexRoot::with_prefix(dir.path(), "../"));
        assert_eq!(hits, vec!["../keep/me.mp4"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("outside");
        let root = dir.path().join("root");
        touch(&outside, "real.mp4");
        touch(&outside, "sub/deep.png");
        touch(&root, "local.jpg");
        symlink(outside.join("real.mp4"), root.join("link.mp4")).unwrap();
        symlink(&outside, root.join("dataset")).unwrap();

        let hits = MediaIndexer::new().scan(&IndexRoot::relative(&root));
        assert_eq!(
            hits,
            vec!["dataset/real.mp4", "dataset/sub/deep.png", "link.mp4", "local.jpg"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_terminates() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "clips/a.mp4");
        symlink(dir.path(), dir.path().join("clips/back")).unwrap();
        symlink(dir.path().join("missing.mp4"), dir.path().join("dangling.mp4")).unwrap();

        let hits = MediaIndexer::new().scan(&IndexRoot::relative(dir.path()));
        assert_eq!(hits, vec!["clips/a.mp4"]);
    }

    #[test]
    fn test_qualified_prefix() {
        let root = IndexRoot::qualified("/data/media");
        assert_eq!(root.prefix, "/data/media/");
        let root = IndexRoot::qualified("rel/dir/");
        assert_eq!(root.prefix, "rel/dir/");
    }
}
