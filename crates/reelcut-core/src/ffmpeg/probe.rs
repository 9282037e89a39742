//! Media Prober
//!
//! Runs ffprobe with JSON output to extract the duration and basic video
//! stream metadata of a media file. The engine never calls this itself;
//! adapters use it to fill `import_video` with real numbers instead of
//! trusting caller-supplied ones.

use std::path::Path;

use super::{ffprobe_bin, FfmpegError, FfmpegResult};
use crate::project::VideoInfo;

/// Media information extracted by FFprobe
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration_sec: f64,
    /// Video stream info (if present)
    pub video: Option<VideoStreamInfo>,
}

/// Video stream information
#[derive(Debug, Clone)]
pub struct VideoStreamInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (frames per second)
    pub fps: f64,
}

impl MediaInfo {
    /// Converts into the opaque metadata the project model carries.
    pub fn to_video_info(&self) -> VideoInfo {
        VideoInfo {
            fps: self.video.as_ref().map(|v| v.fps),
            width: self.video.as_ref().map(|v| v.width),
            height: self.video.as_ref().map(|v| v.height),
        }
    }
}

/// Probe a media file to get its duration and stream information.
pub async fn probe_media(input: &Path) -> FfmpegResult<MediaInfo> {
    if !input.exists() {
        return Err(FfmpegError::InvalidInput(format!(
            "input file does not exist: {}",
            input.display()
        )));
    }

    let output = tokio::process::Command::new(ffprobe_bin())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            &input.to_string_lossy(),
        ])
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FfmpegError::ProbeError(format!(
            "ffprobe failed: {}",
            stderr.trim()
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&json_str)
}

/// Parse FFprobe JSON output
fn parse_probe_output(json_str: &str) -> FfmpegResult<MediaInfo> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FfmpegError::ParseError(format!("failed to parse ffprobe output: {e}")))?;

    let format = json
        .get("format")
        .ok_or_else(|| FfmpegError::ParseError("missing format info".to_string()))?;

    let duration_sec = format
        .get("duration")
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();

    let video = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|c| c.as_str()) == Some("video"))
        .map(parse_video_stream);

    Ok(MediaInfo {
        duration_sec,
        video,
    })
}

fn parse_video_stream(stream: &serde_json::Value) -> VideoStreamInfo {
    let width = stream.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32;
    let height = stream.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32;

    // r_frame_rate is a fraction string, e.g. "30/1" or "30000/1001".
    let fps = stream
        .get("r_frame_rate")
        .and_then(|f| f.as_str())
        .and_then(|s| {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() == 2 {
                let num: f64 = parts[0].parse().ok()?;
                let den: f64 = parts[1].parse().ok()?;
                if den > 0.0 {
                    Some(num / den)
                } else {
                    None
                }
            } else {
                s.parse().ok()
            }
        })
        .unwrap_or(30.0);

    VideoStreamInfo { width, height, fps }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output_video() {
        let json = r#"{
            "format": {
                "duration": "125.5",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2"
            },
            "streams": [
                {
                    "codec_type": "video",
                    "codec_name": "h264",
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30/1"
                },
                {
                    "codec_type": "audio",
                    "codec_name": "aac",
                    "sample_rate": "48000",
                    "channels": 2
                }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration_sec, 125.5);

        let video = info.video.unwrap();
        assert_eq!(video.width, 1920);
        assert_eq!(video.height, 1080);
        assert_eq!(video.fps, 30.0);
    }

    #[test]
    fn test_parse_fractional_framerate() {
        let json = r#"{
            "format": { "duration": "1.0" },
            "streams": [
                {
                    "codec_type": "video",
                    "width": 1280,
                    "height": 720,
                    "r_frame_rate": "30000/1001"
                }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        let video = info.video.unwrap();
        assert!((video.fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_output_audio_only() {
        let json = r#"{
            "format": { "duration": "60.0" },
            "streams": [
                { "codec_type": "audio", "codec_name": "mp3" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration_sec, 60.0);
        assert!(info.video.is_none());
    }

    #[test]
    fn test_parse_probe_output_missing_format() {
        let json = r#"{ "streams": [] }"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn test_to_video_info() {
        let info = MediaInfo {
            duration_sec: 10.0,
            video: Some(VideoStreamInfo {
                width: 1920,
                height: 1080,
                fps: 29.97,
            }),
        };
        let video_info = info.to_video_info();
        assert_eq!(video_info.width, Some(1920));
        assert_eq!(video_info.height, Some(1080));
        assert_eq!(video_info.fps, Some(29.97));
    }
}
