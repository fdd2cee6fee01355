use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::Fps;
use crate::foundation::error::{StoryError, StoryResult};

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn is_empty(&self) -> bool {
        self.interleaved_f32.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }
}

/// Source time range to decode, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start_sec: f64,
    pub duration_sec: f64,
}

fn f32le_to_samples(bytes: &[u8]) -> StoryResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(StoryError::validation(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn is_missing_audio_stream(stderr: &str) -> bool {
    stderr.contains("Stream specifier")
        || stderr.contains("matches no streams")
        || stderr.contains("does not contain any stream")
}

/// Decode audio from a media file to stereo interleaved `f32` PCM.
///
/// A file without an audio stream decodes to empty PCM instead of failing.
pub fn decode_audio_f32_stereo(
    path: &Path,
    sample_rate: u32,
    window: Option<TimeWindow>,
) -> StoryResult<AudioPcm> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error"]);
    if let Some(w) = window {
        cmd.args(["-ss", &format!("{:.6}", w.start_sec.max(0.0))]);
        cmd.args(["-t", &format!("{:.6}", w.duration_sec.max(0.0))]);
    }
    let out = cmd
        .arg("-i")
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| StoryError::Other(anyhow::anyhow!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if is_missing_audio_stream(&msg) {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(StoryError::Other(anyhow::anyhow!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: f32le_to_samples(&out.stdout)?,
    })
}

/// Crop and sampling parameters for [`VideoFrameReader`].
#[derive(Clone, Debug)]
pub struct FrameReaderOpts {
    pub source_path: PathBuf,
    pub window: TimeWindow,
    /// Crop rectangle `(x, y, width, height)` applied before frames leave ffmpeg.
    pub crop: (u32, u32, u32, u32),
    pub fps: Fps,
}

impl FrameReaderOpts {
    fn filter_graph(&self) -> String {
        let (x, y, w, h) = self.crop;
        format!(
            "crop={w}:{h}:{x}:{y},fps={}/{}",
            self.fps.num, self.fps.den
        )
    }
}

/// Streams cropped RGBA8 frames out of an `ffmpeg` child process, one at a time.
pub struct VideoFrameReader {
    child: Child,
    stdout: ChildStdout,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
    exhausted: bool,
    frames_read: u64,
}

impl VideoFrameReader {
    /// Spawn the decoder for the requested window.
    #[tracing::instrument(skip(opts), fields(src = %opts.source_path.display()))]
    pub fn open(opts: &FrameReaderOpts) -> StoryResult<Self> {
        let (_, _, w, h) = opts.crop;
        if w == 0 || h == 0 {
            return Err(StoryError::validation("crop size must be non-zero"));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error"])
            .args(["-ss", &format!("{:.6}", opts.window.start_sec.max(0.0))])
            .args(["-t", &format!("{:.6}", opts.window.duration_sec.max(0.0))])
            .arg("-i")
            .arg(&opts.source_path)
            .args(["-an", "-vf", &opts.filter_graph()])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StoryError::Other(anyhow::anyhow!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StoryError::Other(anyhow::anyhow!("failed to open ffmpeg stdout")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| StoryError::Other(anyhow::anyhow!("failed to open ffmpeg stderr")))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            child,
            stdout,
            stderr_drain: Some(stderr_drain),
            frame_len: w as usize * h as usize * 4,
            exhausted: false,
            frames_read: 0,
        })
    }

    /// Byte length of one frame.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Fill `buf` with the next frame. Returns `false` once the stream is exhausted.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> StoryResult<bool> {
        if buf.len() != self.frame_len {
            return Err(StoryError::validation("frame buffer size mismatch"));
        }
        if self.exhausted {
            return Ok(false);
        }
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.stdout.read(&mut buf[filled..]).map_err(|e| {
                StoryError::Other(anyhow::anyhow!("failed to read frame from ffmpeg: {e}"))
            })?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < buf.len() {
            // A trailing partial frame is dropped.
            self.exhausted = true;
            return Ok(false);
        }
        self.frames_read += 1;
        Ok(true)
    }

    /// Wait for the decoder and surface its error output on failure.
    pub fn finish(mut self) -> StoryResult<()> {
        if !self.exhausted {
            // Caller stopped early; the rest of the stream is not needed.
            let _ = self.child.kill();
        }
        let status = self
            .child
            .wait()
            .map_err(|e| StoryError::Other(anyhow::anyhow!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StoryError::Other(anyhow::anyhow!("ffmpeg stderr drain thread panicked")))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if self.exhausted && !status.success() {
            return Err(StoryError::Other(anyhow::anyhow!(
                "ffmpeg video decode exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
