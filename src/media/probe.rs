use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::error::{StoryError, StoryResult};

/// Basic metadata about a media file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub source_path: PathBuf,
    /// Container duration in seconds, when reported.
    pub duration_sec: Option<f64>,
    /// Width and height of the first video stream.
    pub video_size: Option<(u32, u32)>,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

/// Metadata for a file that must carry video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

fn parse_secs(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn parse_probe_json(source_path: &Path, stdout: &[u8]) -> StoryResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| StoryError::Other(anyhow::anyhow!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let video_size = video.and_then(|s| Some((s.width?, s.height?)));
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    // Prefer the container duration; fall back to the longest stream.
    let duration_sec = parse_secs(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .or_else(|| {
            parsed
                .streams
                .iter()
                .filter_map(|s| parse_secs(s.duration.as_deref()))
                .reduce(f64::max)
        });

    Ok(MediaInfo {
        source_path: source_path.to_path_buf(),
        duration_sec,
        video_size,
        has_audio,
    })
}

/// Probe stream layout and duration through `ffprobe`.
pub fn probe_media(source_path: &Path) -> StoryResult<MediaInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| StoryError::Other(anyhow::anyhow!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StoryError::Other(anyhow::anyhow!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(source_path, &out.stdout)
}

/// Probe a file that must contain a video stream with a known duration.
pub fn probe_video(source_path: &Path) -> StoryResult<VideoSourceInfo> {
    let info = probe_media(source_path)?;
    let (width, height) = info.video_size.ok_or_else(|| {
        StoryError::validation(format!(
            "no video stream found in '{}'",
            source_path.display()
        ))
    })?;
    if width == 0 || height == 0 {
        return Err(StoryError::validation("video stream has zero size"));
    }
    let duration_sec = info.duration_sec.ok_or_else(|| {
        StoryError::validation(format!(
            "unknown duration for '{}'",
            source_path.display()
        ))
    })?;
    Ok(VideoSourceInfo {
        source_path: info.source_path,
        width,
        height,
        duration_sec,
        has_audio: info.has_audio,
    })
}

/// Measured playback length of an audio (or any media) file.
pub fn probe_duration(path: &Path) -> StoryResult<f64> {
    probe_media(path)?
        .duration_sec
        .filter(|d| *d > 0.0)
        .ok_or_else(|| {
            StoryError::validation(format!("no positive duration for '{}'", path.display()))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
