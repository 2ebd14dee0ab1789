//! rview-index - Offline media indexer
//!
//! Scans a directory tree for media files and writes the sorted listing to
//! an index file as a JSON array. By default the listing is appended to the
//! file, so repeated runs accumulate one array per run; `--overwrite`
//! replaces it instead.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rview_common::config::OUTPUT_FILE_STEM;
use rview_common::indexer::{IndexRoot, MediaIndexer};
use tracing::info;

/// Command-line arguments for rview-index
#[derive(Parser, Debug)]
#[command(name = "rview-index")]
#[command(about = "Index media files for the research viewer")]
#[command(version)]
struct Args {
    /// Directory to index
    #[arg(short, long, default_value = ".")]
    target_dir: PathBuf,

    /// Index file to write
    #[arg(short, long, default_value = "files.json")]
    output: PathBuf,

    /// Replace the index file instead of appending to it
    #[arg(long)]
    overwrite: bool,

    /// Viewer asset directory inside the target, left out of the index
    #[arg(long, default_value = "viewer")]
    asset_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let files = index(&args.target_dir, &args.asset_dir);
    info!("Found {} media files under {}", files.len(), args.target_dir.display());

    write_index(&args.output, &files, args.overwrite)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Indexed {} files into {}", files.len(), args.output.display());
    Ok(())
}

/// Sorted media listing for `target`
///
/// Paths are relative when indexing the current directory and prefixed
/// with the target directory otherwise.
fn index(target: &Path, asset_dir: &Path) -> Vec<String> {
    let root = if target == Path::new(".") {
        IndexRoot::relative(target)
    } else {
        IndexRoot::qualified(target)
    };

    MediaIndexer::new()
        .exclude_matching(OUTPUT_FILE_STEM)
        .exclude_dir(asset_dir)
        .scan(&root)
}

/// Write the listing as a pretty-printed JSON array
fn write_index(path: &Path, files: &[String], overwrite: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(!overwrite)
        .truncate(overwrite)
        .open(path)?;

    let json = serde_json::to_string_pretty(files)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
