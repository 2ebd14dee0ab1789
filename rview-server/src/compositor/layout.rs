//! Grid geometry and duration resolution

/// Target duration: the longest probed video, floored at `min_duration`
pub fn resolve_target_duration<I>(durations: I, min_duration: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    durations
        .into_iter()
        .filter(|d| d.is_finite())
        .fold(min_duration, f64::max)
}

/// Pixel offsets of every tile, row-major
pub fn tile_offsets(cols: u32, rows: u32, tile_width: u32, tile_height: u32) -> Vec<(u32, u32)> {
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col * tile_width, row * tile_height)))
        .collect()
}

/// `xstack` layout argument for the given offsets
pub fn xstack_layout(offsets: &[(u32, u32)]) -> String {
    offsets
        .iter()
        .map(|(x, y)| format!("{}_{}", x, y))
        .collect::<Vec<_>>()
        .join("|")
}

/// Seconds as passed to ffmpeg duration options
///
/// Rounded up to the millisecond so held inputs never end before the
/// longest video.
pub fn format_seconds(seconds: f64) -> String {
    // Absorb float noise such as 10.01 * 1000.0 == 10010.000000000002
    let millis = (seconds * 1000.0 - 1e-6).ceil();
    format!("{:.3}", millis / 1000.0)
}
