//! FFmpeg Cutter
//!
//! Executes FFmpeg to materialize one highlight range as a standalone clip.
//! Cuts are stream copies (`-c copy`): no re-encode and no codec inspection;
//! the engine treats the operation as opaque.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{ffmpeg_bin, FfmpegError, FfmpegResult};
use crate::export::{CutError, VideoCutter};
use crate::TimeSec;

/// FFmpeg-backed implementation of the video-cutting capability.
#[derive(Clone)]
pub struct FfmpegCutter {
    ffmpeg_path: String,
}

impl FfmpegCutter {
    /// Creates a cutter using the discovered ffmpeg binary.
    pub fn new() -> Self {
        Self {
            ffmpeg_path: ffmpeg_bin(),
        }
    }

    /// Creates a cutter with an explicit ffmpeg binary path.
    pub fn with_path(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    async fn cut_clip(
        &self,
        source: &Path,
        start_sec: TimeSec,
        end_sec: TimeSec,
        output: &Path,
    ) -> FfmpegResult<()> {
        if !source.exists() {
            return Err(FfmpegError::InvalidInput(format!(
                "source file does not exist: {}",
                source.display()
            )));
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // -ss before -i for fast seeking; -avoid_negative_ts keeps the
        // stream-copied timestamps playable from zero.
        let duration = end_sec - start_sec;
        let result = tokio::process::Command::new(&self.ffmpeg_path)
            .args([
                "-y",
                "-hide_banner",
                "-loglevel",
                "error",
                "-ss",
                &format!("{start_sec:.3}"),
                "-i",
                &source.to_string_lossy(),
                "-t",
                &format!("{duration:.3}"),
                "-c",
                "copy",
                "-avoid_negative_ts",
                "make_zero",
                &output.to_string_lossy(),
            ])
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(FfmpegError::ExecutionFailed(stderr.trim().to_string()));
        }

        debug!(
            source = %source.display(),
            output = %output.display(),
            "cut clip {start_sec:.3}~{end_sec:.3}s"
        );
        Ok(())
    }
}

impl Default for FfmpegCutter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoCutter for FfmpegCutter {
    async fn cut(
        &self,
        source: &Path,
        start_sec: TimeSec,
        end_sec: TimeSec,
        output: &Path,
    ) -> Result<(), CutError> {
        self.cut_clip(source, start_sec, end_sec, output)
            .await
            .map_err(|e| CutError(e.to_string()))
    }
}
