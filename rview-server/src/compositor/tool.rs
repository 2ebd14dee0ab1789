//! External media tool driver
//!
//! Probing and composition are delegated to ffprobe/ffmpeg. The `MediaTool`
//! trait is the seam between the compositor and the processes, so the
//! compositor can be exercised without ffmpeg installed.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Bytes of stderr kept when a tool fails
const STDERR_TAIL_BYTES: usize = 4096;

/// External tool failure
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and reported failure
    #[error("{program} failed ({}): {stderr}", describe_exit(*exit_code))]
    Failed {
        program: String,
        /// `None` when the process was killed by a signal
        exit_code: Option<i32>,
        stderr: String,
    },

    /// ffprobe output was not a usable duration
    #[error("unusable duration {0:?}")]
    BadDuration(String),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Probing and composition backend
pub trait MediaTool: Send + Sync {
    /// Duration of a media file in seconds
    fn probe_duration(&self, path: &Path) -> Result<f64, ToolError>;

    /// Run the composition tool with a complete argument list
    fn compose(&self, args: &[String]) -> Result<(), ToolError>;
}

/// ffmpeg/ffprobe subprocess backend
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTool {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<std::process::Output, ToolError> {
        let name = program.display().to_string();
        debug!("Running {} with {} arguments", name, args.len());

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Launch {
                program: name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: name,
                exit_code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(output)
    }
}

impl MediaTool for FfmpegTool {
    fn probe_duration(&self, path: &Path) -> Result<f64, ToolError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().into_owned(),
        ];
        let output = self.run(&self.ffprobe, &args)?;
        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn compose(&self, args: &[String]) -> Result<(), ToolError> {
        self.run(&self.ffmpeg, args).map(|_| ())
    }
}

/// Parse ffprobe's bare duration output
pub fn parse_duration(stdout: &str) -> Result<f64, ToolError> {
    let trimmed = stdout.trim();
    match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(ToolError::BadDuration(trimmed.to_string())),
    }
}

/// Last part of a process's stderr, lossily decoded
pub fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim_end();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("7.500000\n").unwrap(), 7.5);
        assert!(matches!(parse_duration("N/A"), Err(ToolError::BadDuration(_))));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-1").is_err());
    }

    #[test]
    fn test_stderr_tail_truncates_from_front() {
        let long = "x".repeat(STDERR_TAIL_BYTES) + "END";
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.len(), STDERR_TAIL_BYTES);
        assert!(tail.ends_with("END"));
        assert_eq!(stderr_tail(b"short\n"), "short");
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let tool = FfmpegTool::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        assert!(matches!(
            tool.probe_duration(Path::new("clip.mp4")),
            Err(ToolError::Launch { .. })
        ));
        assert!(matches!(tool.compose(&[]), Err(ToolError::Launch { .. })));
    }
}
