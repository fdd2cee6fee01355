//! Text-to-speech backends and the primary/fallback narration chain.

/// `edge-tts` command-line fallback.
pub mod edge;
/// TikTok-voice HTTP endpoint.
pub mod tiktok;

use std::path::{Path, PathBuf};

use crate::foundation::error::{StoryError, StoryResult};

/// Converts text into an audio file.
pub trait NarrationBackend {
    /// Short backend name for logs.
    fn name(&self) -> &str;
    /// Write speech for `text` spoken by `voice` to `out`, returning the written path.
    fn synthesize(&self, text: &str, voice: &str, out: &Path) -> StoryResult<PathBuf>;
}

/// Narration audio produced for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrationOutput {
    pub path: PathBuf,
    pub backend: String,
    pub voice: String,
}

/// Primary backend with a single fallback.
///
/// The fallback runs only when the primary errors or reports a path that does not exist.
pub struct Narrator {
    primary: Box<dyn NarrationBackend>,
    fallback: Box<dyn NarrationBackend>,
    fallback_voice: String,
}

impl Narrator {
    pub fn new(
        primary: Box<dyn NarrationBackend>,
        fallback: Box<dyn NarrationBackend>,
        fallback_voice: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            fallback,
            fallback_voice: fallback_voice.into(),
        }
    }

    pub fn narrate(&self, text: &str, voice: &str, out: &Path) -> StoryResult<NarrationOutput> {
        if text.trim().is_empty() {
            return Err(StoryError::synthesis("narration text is empty"));
        }

        match self.primary.synthesize(text, voice, out) {
            Ok(path) if path.is_file() => {
                tracing::info!(backend = self.primary.name(), voice, path = %path.display(), "narration ready");
                return Ok(NarrationOutput {
                    path,
                    backend: self.primary.name().to_string(),
                    voice: voice.to_string(),
                });
            }
            Ok(path) => {
                tracing::warn!(backend = self.primary.name(), path = %path.display(), "primary narration produced no file");
            }
            Err(e) => {
                tracing::warn!(backend = self.primary.name(), error = %e, "primary narration failed");
            }
        }

        let voice = self.fallback_voice.as_str();
        tracing::info!(backend = self.fallback.name(), voice, "falling back");
        match self.fallback.synthesize(text, voice, out) {
            Ok(path) if path.is_file() => Ok(NarrationOutput {
                path,
                backend: self.fallback.name().to_string(),
                voice: voice.to_string(),
            }),
            Ok(path) => Err(StoryError::synthesis(format!(
                "fallback '{}' reported '{}' but no file exists",
                self.fallback.name(),
                path.display()
            ))),
            Err(e) => Err(StoryError::synthesis(format!(
                "primary and fallback narration failed; last error: {e}"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/narrator.rs"]
mod tests;
