//! FFmpeg Integration Module
//!
//! Provides the FFmpeg-backed implementation of the video-cutting capability
//! and an ffprobe-based media prober for adapters.
//!
//! Binary discovery: `REELCUT_FFMPEG_PATH` / `REELCUT_FFPROBE_PATH`
//! environment overrides, falling back to `ffmpeg` / `ffprobe` on `PATH`.

mod probe;
mod runner;

pub use probe::{probe_media, MediaInfo, VideoStreamInfo};
pub use runner::FfmpegCutter;

/// FFmpeg-related error types
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg execution failed: {0}")]
    ExecutionFailed(String),

    #[error("invalid input file: {0}")]
    InvalidInput(String),

    #[error("process error: {0}")]
    ProcessError(#[from] std::io::Error),

    #[error("ffprobe error: {0}")]
    ProbeError(String),

    #[error("parse error: {0}")]
    ParseError(String),
}

pub type FfmpegResult<T> = Result<T, FfmpegError>;

/// Path to the ffmpeg binary.
pub fn ffmpeg_bin() -> String {
    std::env::var("REELCUT_FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
}

/// Path to the ffprobe binary.
pub fn ffprobe_bin() -> String {
    std::env::var("REELCUT_FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string())
}
