//! Grid layout history
//!
//! The history is an ordered list of grid snapshots, most recent first,
//! persisted as a single pretty-printed JSON array. Every write re-serializes
//! the whole list through a temporary file that is renamed into place.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Default name given to entries saved without one
pub const UNTITLED: &str = "Untitled";

/// One grid cell: an optional media reference plus a caption
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Media path as the UI reports it; `None` renders a black placeholder
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub caption: String,
}

impl Cell {
    pub fn new(file: Option<&str>, caption: &str) -> Self {
        Self {
            file: file.map(str::to_string),
            caption: caption.to_string(),
        }
    }

    /// Media reference, treating an empty string like a missing one
    pub fn source(&self) -> Option<&str> {
        self.file.as_deref().filter(|f| !f.trim().is_empty())
    }
}

/// A named grid arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub name: String,
    /// Seconds since the Unix epoch at save time
    pub timestamp: f64,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
}

impl GridLayout {
    /// Build a layout stamped with the current time
    pub fn new(name: Option<String>, cols: u32, rows: u32, cells: Vec<Cell>) -> Result<Self> {
        check_grid_shape(cols, rows, cells.len())?;
        Ok(Self {
            name: name.unwrap_or_else(|| UNTITLED.to_string()),
            timestamp: now_timestamp(),
            cols,
            rows,
            cells,
        })
    }
}

/// Reject grids with a zero dimension or a cell count that does not fill them
pub fn check_grid_shape(cols: u32, rows: u32, cell_count: usize) -> Result<()> {
    if cols == 0 || rows == 0 {
        return Err(Error::InvalidInput(format!(
            "grid dimensions must be positive (cols={}, rows={})",
            cols, rows
        )));
    }
    let expected = cols as usize * rows as usize;
    if cell_count != expected {
        return Err(Error::InvalidInput(format!(
            "a {}x{} grid needs {} cells, got {}",
            cols, rows, expected, cell_count
        )));
    }
    Ok(())
}

/// Current time as fractional Unix seconds
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// What a write did to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Entry was prepended at index 0
    Inserted,
    /// Entry replaced the element at this index
    Replaced(usize),
}

/// JSON-file backed history
///
/// Read-modify-write cycles are serialized by an internal lock; readers go
/// straight to the file, which is only ever replaced by an atomic rename.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history, reporting a corrupt file as an error
    ///
    /// A missing file or one holding only whitespace is an empty history.
    pub fn load(&self) -> Result<Vec<GridLayout>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| Error::CorruptHistory {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Load the history, treating any failure as an empty history
    pub fn read(&self) -> Vec<GridLayout> {
        match self.load() {
            Ok(history) => history,
            Err(e) => {
                warn!("Treating history as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the entry at `target_index` if it exists, else prepend
    pub fn write(&self, entry: GridLayout, target_index: Option<i64>) -> Result<WriteOutcome> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut history = match self.load() {
            Ok(history) => history,
            Err(Error::CorruptHistory { reason, .. }) => {
                let backup = self.sibling("corrupt");
                warn!(
                    "History file {} is corrupt ({}); moving it to {} and starting fresh",
                    self.path.display(),
                    reason,
                    backup.display()
                );
                fs::rename(&self.path, &backup)?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let outcome = match target_index.and_then(|i| usize::try_from(i).ok()) {
            Some(index) if index < history.len() => {
                history[index] = entry;
                WriteOutcome::Replaced(index)
            }
            _ => {
                history.insert(0, entry);
                WriteOutcome::Inserted
            }
        };

        self.persist(&history)?;
        debug!("History now holds {} entries ({:?})", history.len(), outcome);
        Ok(outcome)
    }

    fn persist(&self, history: &[GridLayout]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating history directory {}", parent.display());
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.sibling("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(history)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout(name: &str) -> GridLayout {
        GridLayout::new(
            Some(name.to_string()),
            2,
            1,
            vec![Cell::new(Some("../a.mp4"), "left"), Cell::new(None, "")],
        )
        .unwrap()
    }

    fn store(dir: &TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("viewer").join("history.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_write_prepends() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(store.write(layout("first"), None).unwrap(), WriteOutcome::Inserted);
        assert_eq!(store.write(layout("second"), None).unwrap(), WriteOutcome::Inserted);

        let history = store.load().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].name, "second");
        assert_eq!(history[1].name, "first");
    }

    #[test]
    fn test_write_replaces_existing_index() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write(layout("a"), None).unwrap();
        store.write(layout("b"), None).unwrap();
        store.write(layout("c"), None).unwrap();
        let before = store.load().unwrap();

        let replacement = layout("replaced");
        assert_eq!(
            store.write(replacement.clone(), Some(1)).unwrap(),
            WriteOutcome::Replaced(1)
        );

        let after = store.load().unwrap();
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], replacement);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_out_of_range_index_prepends() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write(layout("a"), None).unwrap();

        for bad in [1, 7, -1, i64::MIN] {
            assert_eq!(store.write(layout("x"), Some(bad)).unwrap(), WriteOutcome::Inserted);
        }

        let history = store.load().unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[4].name, "a");
    }

    #[test]
    fn test_corrupt_file_is_distinguished_from_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(Error::CorruptHistory { .. })));
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_write_over_corrupt_file_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "garbage").unwrap();

        store.write(layout("fresh"), Some(0)).unwrap();

        let history = store.load().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "fresh");

        let backup = dir.path().join("viewer").join("history.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "garbage");
    }

    #[test]
    fn test_grid_shape_checks() {
        assert!(check_grid_shape(2, 2, 4).is_ok());
        assert!(check_grid_shape(0, 2, 0).is_err());
        assert!(check_grid_shape(2, 2, 3).is_err());
    }

    #[test]
    fn test_cell_source_ignores_empty() {
        assert_eq!(Cell::new(Some(""), "c").source(), None);
        assert_eq!(Cell::new(Some("a.png"), "c").source(), Some("a.png"));
        let parsed: Cell = serde_json::from_str(r#"{"file": null}"#).unwrap();
        assert_eq!(parsed, Cell::default());
    }
}
