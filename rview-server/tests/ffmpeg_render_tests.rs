//! Render tests against a real ffmpeg installation
//!
//! Ignored by default; run with `cargo test -- --ignored` on a machine with
//! ffmpeg and ffprobe on PATH.

use rview_common::config::ViewerConfig;
use rview_common::Cell;
use rview_server::compositor::{Compositor, FfmpegTool, RenderRequest};
use std::sync::Arc;
use tempfile::TempDir;

fn compositor(dir: &TempDir) -> Compositor {
    let mut config = ViewerConfig {
        working_root: dir.path().to_path_buf(),
        ..Default::default()
    };
    config.render.min_duration = 1.0;
    config.render.cell_width = 160;
    config.render.cell_height = 90;
    config.render.caption_height = 20;
    config.render.font_size = 12;
    Compositor::new(&config, Arc::new(FfmpegTool::new("ffmpeg", "ffprobe")))
}

#[test]
#[ignore = "requires ffmpeg"]
fn test_render_overwrites_fixed_output() {
    let dir = TempDir::new().unwrap();
    let compositor = compositor(&dir);

    let first = compositor
        .render(&RenderRequest {
            cols: 1,
            rows: 1,
            cells: vec![Cell::new(None, "one")],
        })
        .expect("first render");
    let first_len = std::fs::metadata(&first.path).unwrap().len();

    let second = compositor
        .render(&RenderRequest {
            cols: 2,
            rows: 2,
            cells: vec![
                Cell::new(None, "a: colon"),
                Cell::new(None, "it's quoted"),
                Cell::new(None, "x, y; [z]"),
                Cell::new(None, ""),
            ],
        })
        .expect("second render");

    assert_eq!(first.path, second.path);
    let second_len = std::fs::metadata(&second.path).unwrap().len();
    assert_ne!(first_len, second_len);
}

#[test]
#[ignore = "requires ffmpeg"]
fn test_missing_input_reports_failure() {
    let dir = TempDir::new().unwrap();
    let compositor = compositor(&dir);

    let result = compositor.render(&RenderRequest {
        cols: 1,
        rows: 1,
        cells: vec![Cell::new(Some("../does-not-exist.mp4"), "")],
    });
    assert!(result.is_err());
}
