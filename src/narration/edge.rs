use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::config::NarrationConfig;
use crate::foundation::error::{StoryError, StoryResult};
use crate::narration::NarrationBackend;

/// Runs the `edge-tts` CLI, then speeds the result up with `ffmpeg atempo`.
pub struct EdgeTtsCommand {
    program: String,
    tempo: f64,
}

impl EdgeTtsCommand {
    pub fn new(program: impl Into<String>, tempo: f64) -> Self {
        Self {
            program: program.into(),
            tempo,
        }
    }

    pub fn from_config(cfg: &NarrationConfig) -> Self {
        Self::new(cfg.fallback_program.clone(), cfg.fallback_tempo)
    }

    fn speak(&self, text_file: &Path, voice: &str, raw_out: &Path) -> StoryResult<()> {
        let out = Command::new(&self.program)
            .arg("--voice")
            .arg(voice)
            .arg("--file")
            .arg(text_file)
            .arg("--write-media")
            .arg(raw_out)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                StoryError::synthesis(format!("failed to run '{}': {e}", self.program))
            })?;
        if !out.status.success() {
            return Err(StoryError::synthesis(format!(
                "'{}' exited with status {}: {}",
                self.program,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// `ffmpeg -filter:a` argument for a tempo change.
pub fn atempo_filter(tempo: f64) -> String {
    format!("atempo={tempo}")
}

impl NarrationBackend for EdgeTtsCommand {
    fn name(&self) -> &str {
        "edge-tts"
    }

    fn synthesize(&self, text: &str, voice: &str, out: &Path) -> StoryResult<PathBuf> {
        let scratch = tempfile::tempdir()
            .map_err(|e| StoryError::synthesis(format!("failed to create scratch dir: {e}")))?;
        let text_file = scratch.path().join("narration.txt");
        let raw = scratch.path().join("narration_raw.mp3");
        std::fs::write(&text_file, text)
            .map_err(|e| StoryError::synthesis(format!("failed to stage narration text: {e}")))?;

        self.speak(&text_file, voice, &raw)?;

        crate::encode::ffmpeg::ensure_parent_dir(out)?;
        let adjusted = Command::new("ffmpeg")
            .args(["-v", "error", "-y", "-i"])
            .arg(&raw)
            .args(["-filter:a", &atempo_filter(self.tempo)])
            .arg(out)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StoryError::synthesis(format!("failed to run ffmpeg for tempo: {e}")))?;
        if !adjusted.status.success() {
            return Err(StoryError::synthesis(format!(
                "ffmpeg tempo adjust failed: {}",
                String::from_utf8_lossy(&adjusted.stderr).trim()
            )));
        }
        Ok(out.to_path_buf())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/edge.rs"]
mod tests;
