use std::path::{Path, PathBuf};

use crate::foundation::error::{StoryError, StoryResult};

/// File looked up in the working directory when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "storyreel.json";

/// Top-level runtime configuration.
///
/// Every field has a default, so an absent or partial JSON file is valid.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub state: StateConfig,
    pub media: MediaConfig,
    pub source: SourceConfig,
    pub selection: SelectionConfig,
    pub narration: NarrationConfig,
    pub captions: CaptionConfig,
    pub compose: ComposeConfig,
}

/// Locations of the persisted JSON state records.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub used_path: PathBuf,
    pub blacklist_path: PathBuf,
    pub voice_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            used_path: PathBuf::from("used_stories.json"),
            blacklist_path: PathBuf::from("blacklisted_stories.json"),
            voice_path: PathBuf::from("last_voice.json"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Long gameplay/ambient clip that output videos are sliced from.
    pub background_video: PathBuf,
    /// Optional music bed; a missing file falls back to the clip's own audio.
    pub background_music: Option<PathBuf>,
    /// Where narration audio is written before composition.
    pub narration_path: PathBuf,
    /// Root of `<group_slug>/<title>.mp4` outputs.
    pub output_root: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            background_video: PathBuf::from("static/minecraft_background.mp4"),
            background_music: Some(PathBuf::from("static/lofi_background.wav")),
            narration_path: PathBuf::from("narration.mp3"),
            output_root: PathBuf::from("rendered_videos"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("storyreel/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Hard ceiling on estimated narration length.
    pub max_duration_secs: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: crate::selection::duration::MAX_NARRATION_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// TikTok-voice generation endpoint (JSON `{text, voice}` in, base64 MP3 out).
    pub endpoint: String,
    pub max_chunk_chars: usize,
    pub timeout_secs: u64,
    /// Command-line TTS used when the primary endpoint yields no file.
    pub fallback_program: String,
    pub fallback_voice: String,
    /// `atempo` factor applied to fallback narration.
    pub fallback_tempo: f64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://tiktok-tts.weilnet.workers.dev/api/generation".to_string(),
            max_chunk_chars: 300,
            timeout_secs: 60,
            fallback_program: "edge-tts".to_string(),
            fallback_voice: "en-US-AndrewNeural".to_string(),
            fallback_tempo: 1.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub font_size_px: f32,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files before system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Captions longer than this are split in two.
    pub max_caption_chars: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_size_px: 48.0,
            font_dirs: vec![PathBuf::from("fonts")],
            max_caption_chars: crate::captions::timing::MAX_CAPTION_CHARS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub fps: u32,
    pub narration_gain: f32,
    pub music_gain: f32,
    pub ambient_gain: f32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            narration_gain: 0.9,
            music_gain: 0.15,
            ambient_gain: 0.05,
        }
    }
}

impl StoryConfig {
    /// Load configuration from `explicit`, or from [`DEFAULT_CONFIG_FILE`] when present.
    ///
    /// An explicit path must exist; the implicit file is optional.
    pub fn load(explicit: Option<&Path>) -> StoryResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> StoryResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StoryError::config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
            .map_err(|e| StoryError::config(format!("'{}': {e}", path.display())))
    }

    pub fn from_json_str(text: &str) -> StoryResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| StoryError::config(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> StoryResult<()> {
        if self.compose.fps == 0 {
            return Err(StoryError::config("compose.fps must be > 0"));
        }
        for (name, gain) in [
            ("narration_gain", self.compose.narration_gain),
            ("music_gain", self.compose.music_gain),
            ("ambient_gain", self.compose.ambient_gain),
        ] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(StoryError::config(format!(
                    "compose.{name} must be finite and >= 0"
                )));
            }
        }
        if !self.captions.font_size_px.is_finite() || self.captions.font_size_px <= 0.0 {
            return Err(StoryError::config("captions.font_size_px must be > 0"));
        }
        if self.captions.max_caption_chars == 0 {
            return Err(StoryError::config("captions.max_caption_chars must be > 0"));
        }
        if !self.selection.max_duration_secs.is_finite() || self.selection.max_duration_secs <= 0.0
        {
            return Err(StoryError::config("selection.max_duration_secs must be > 0"));
        }
        if self.narration.max_chunk_chars == 0 {
            return Err(StoryError::config("narration.max_chunk_chars must be > 0"));
        }
        if !self.narration.fallback_tempo.is_finite()
            || !(0.5..=100.0).contains(&self.narration.fallback_tempo)
        {
            return Err(StoryError::config(
                "narration.fallback_tempo must be within [0.5, 100]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
