//! ffmpeg argument construction for grid renders
//!
//! Arguments are collected into a `Vec<String>` and handed to the process
//! as-is. Only the `-filter_complex` value carries user text, and that text
//! goes through [`escape_filter_text`].

use rview_common::config::RenderSettings;
use std::path::{Path, PathBuf};

use super::escape::escape_filter_text;
use super::layout::{format_seconds, tile_offsets, xstack_layout};

/// Label of the composited output stream
const OUTPUT_LABEL: &str = "outv";

/// Where one cell's frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput {
    /// Video file used directly
    Video(PathBuf),
    /// Still image looped for the target duration
    Image(PathBuf),
    /// Solid black source held for the target duration
    Placeholder,
}

/// A cell ready to be turned into ffmpeg inputs and filters
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    pub input: CellInput,
    pub caption: String,
}

/// Ordered ffmpeg argument list builder
#[derive(Debug, Clone, Default)]
pub struct FfmpegArgs {
    args: Vec<String>,
}

impl FfmpegArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare flag
    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.args.push(flag.to_string());
        self
    }

    /// Append an option and its value
    pub fn opt(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.args.push(name.to_string());
        self.args.push(value.into());
        self
    }

    /// Append a path argument
    pub fn path(&mut self, path: &Path) -> &mut Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Append the inputs for one cell
    pub fn cell_input(
        &mut self,
        input: &CellInput,
        duration: f64,
        settings: &RenderSettings,
    ) -> &mut Self {
        match input {
            CellInput::Video(path) => self.flag("-i").path(path),
            CellInput::Image(path) => self
                .opt("-loop", "1")
                .opt("-t", format_seconds(duration))
                .flag("-i")
                .path(path),
            CellInput::Placeholder => self.opt("-f", "lavfi").opt(
                "-i",
                format!(
                    "color=c=black:s={}x{}:d={}",
                    settings.cell_width,
                    settings.cell_height,
                    format_seconds(duration)
                ),
            ),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}

/// Filter chain turning input `index` into labelled tile `v{index}`
pub fn cell_filter(
    index: usize,
    caption: &str,
    settings: &RenderSettings,
    font: Option<&Path>,
) -> String {
    let w = settings.cell_width;
    let h = settings.cell_height;

    let mut chain = format!(
        "[{index}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{total}:(ow-iw)/2:({h}-ih)/2:color=black,\
         fps={fps},format={pix},setsar=1",
        total = settings.total_cell_height(),
        fps = settings.fps,
        pix = settings.pixel_format,
    );

    if let Some(font) = font.filter(|_| !caption.trim().is_empty()) {
        chain.push_str(&format!(
            ",drawtext=fontfile={font}:text={text}:expansion=none:\
             fontcolor=white:fontsize={size}:x=(w-text_w)/2:y={h}+({band}-text_h)/2",
            font = escape_filter_text(&font.to_string_lossy()),
            text = escape_filter_text(caption),
            size = settings.font_size,
            band = settings.caption_height,
        ));
    }

    chain.push_str(&format!("[v{}]", index));
    chain
}

/// Complete `-filter_complex` value for a grid
pub fn filter_graph(
    cols: u32,
    rows: u32,
    captions: &[&str],
    settings: &RenderSettings,
    font: Option<&Path>,
) -> String {
    let mut graph: String = captions
        .iter()
        .enumerate()
        .map(|(i, caption)| format!("{};", cell_filter(i, caption, settings, font)))
        .collect();

    // xstack needs at least two inputs; a lone tile passes straight through
    if captions.len() == 1 {
        graph.push_str(&format!("[v0]null[{}]", OUTPUT_LABEL));
        return graph;
    }

    for i in 0..captions.len() {
        graph.push_str(&format!("[v{}]", i));
    }

    let offsets = tile_offsets(cols, rows, settings.cell_width, settings.total_cell_height());
    graph.push_str(&format!(
        "xstack=inputs={}:layout={}[{}]",
        captions.len(),
        xstack_layout(&offsets),
        OUTPUT_LABEL
    ));
    graph
}

/// Full ffmpeg argument list for a grid render
pub fn render_args(
    cols: u32,
    rows: u32,
    cells: &[PlannedCell],
    duration: f64,
    settings: &RenderSettings,
    font: Option<&Path>,
    output: &Path,
) -> Vec<String> {
    let mut args = FfmpegArgs::new();
    args.flag("-y");

    for cell in cells {
        args.cell_input(&cell.input, duration, settings);
    }

    let captions: Vec<&str> = cells.iter().map(|c| c.caption.as_str()).collect();
    args.opt("-filter_complex", filter_graph(cols, rows, &captions, settings, font))
        .opt("-map", format!("[{}]", OUTPUT_LABEL))
        .opt("-c:v", settings.video_codec.clone())
        .opt("-crf", settings.crf.to_string())
        .opt("-pix_fmt", settings.pixel_format.clone())
        .path(output);

    args.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RenderSettings {
        RenderSettings::default()
    }

    #[test]
    fn test_cell_inputs() {
        let s = settings();
        let mut args = FfmpegArgs::new();
        args.cell_input(&CellInput::Video("a.mp4".into()), 7.5, &s)
            .cell_input(&CellInput::Image("b.png".into()), 7.5, &s)
            .cell_input(&CellInput::Placeholder, 7.5, &s);

        assert_eq!(
            args.into_vec(),
            vec![
                "-i", "a.mp4",
                "-loop", "1", "-t", "7.500", "-i", "b.png",
                "-f", "lavfi", "-i", "color=c=black:s=1280x720:d=7.500",
            ]
        );
    }

    #[test]
    fn test_cell_filter_without_caption() {
        let filter = cell_filter(2, "", &settings(), Some(Path::new("/f.ttf")));
        assert_eq!(
            filter,
            "[2:v]scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:800:(ow-iw)/2:(720-ih)/2:color=black,\
             fps=30,format=yuv420p,setsar=1[v2]"
        );
    }

    #[test]
    fn test_cell_filter_with_caption() {
        let filter = cell_filter(0, "run 1: it's fine", &settings(), Some(Path::new("/f.ttf")));
        assert!(filter.contains(
            ",drawtext=fontfile=/f.ttf:text=run 1\\\\: it\\\\\\'s fine:expansion=none:"
        ));
        assert!(filter.contains("fontsize=40:x=(w-text_w)/2:y=720+(80-text_h)/2[v0]"));
    }

    #[test]
    fn test_caption_dropped_without_font() {
        let filter = cell_filter(0, "label", &settings(), None);
        assert!(!filter.contains("drawtext"));
    }

    #[test]
    fn test_filter_graph_tiles_row_major() {
        let graph = filter_graph(2, 2, &["", "", "", ""], &settings(), None);
        assert!(graph.ends_with(
            "[v0][v1][v2][v3]xstack=inputs=4:layout=0_0|1280_0|0_800|1280_800[outv]"
        ));
        assert!(!graph.contains("shortest"));
        assert_eq!(graph.matches("scale=").count(), 4);
    }

    #[test]
    fn test_single_cell_skips_xstack() {
        let graph = filter_graph(1, 1, &["solo"], &settings(), Some(Path::new("/f.ttf")));
        assert!(!graph.contains("xstack"));
        assert!(graph.contains("text=solo:"));
        assert!(graph.ends_with("[v0];[v0]null[outv]"));
    }

    #[test]
    fn test_two_cells_still_stack() {
        let graph = filter_graph(1, 2, &["", ""], &settings(), None);
        assert!(graph.ends_with("[v0][v1]xstack=inputs=2:layout=0_0|0_800[outv]"));
    }

    #[test]
    fn test_render_args_tail() {
        let cells = vec![PlannedCell {
            input: CellInput::Placeholder,
            caption: String::new(),
        }];
        let args = render_args(1, 1, &cells, 5.0, &settings(), None, Path::new("viewer/grid_output.mp4"));

        assert_eq!(args[0], "-y");
        let tail: Vec<&str> = args[args.len() - 9..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "-map", "[outv]", "-c:v", "libx264", "-crf", "20",
                "-pix_fmt", "yuv420p", "viewer/grid_output.mp4",
            ]
        );
    }
}
