use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;

use crate::foundation::config::NarrationConfig;
use crate::foundation::error::{StoryError, StoryResult};
use crate::narration::NarrationBackend;

#[derive(Debug, serde::Serialize)]
struct GenerationRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Split `text` into pieces of at most `max_chars` characters, breaking between words.
///
/// A single word longer than `max_chars` is hard-split on character boundaries.
pub fn chunk_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// TikTok voice generation over a JSON HTTP endpoint returning base64 MP3 data.
pub struct TikTokTts {
    client: reqwest::blocking::Client,
    endpoint: String,
    max_chunk_chars: usize,
}

impl TikTokTts {
    pub fn new(cfg: &NarrationConfig) -> StoryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| StoryError::config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            max_chunk_chars: cfg.max_chunk_chars,
        })
    }

    fn generate_chunk(&self, text: &str, voice: &str) -> StoryResult<Vec<u8>> {
        let resp: GenerationResponse = self
            .client
            .post(&self.endpoint)
            .json(&GenerationRequest { text, voice })
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| StoryError::synthesis(format!("tts request failed: {e}")))?;
        decode_response(resp)
    }
}

fn decode_response(resp: GenerationResponse) -> StoryResult<Vec<u8>> {
    if resp.success == Some(false) {
        return Err(StoryError::synthesis(format!(
            "tts endpoint refused: {}",
            resp.error.unwrap_or_else(|| "unknown error".to_string())
        )));
    }
    let data = resp
        .data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| StoryError::synthesis("tts response carried no audio"))?;
    base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|e| StoryError::synthesis(format!("tts audio is not valid base64: {e}")))
}

impl NarrationBackend for TikTokTts {
    fn name(&self) -> &str {
        "tiktok"
    }

    fn synthesize(&self, text: &str, voice: &str, out: &Path) -> StoryResult<PathBuf> {
        let chunks = chunk_for_speech(text, self.max_chunk_chars);
        if chunks.is_empty() {
            return Err(StoryError::synthesis("nothing to narrate"));
        }
        tracing::debug!(chunks = chunks.len(), voice, "requesting tiktok narration");

        // MP3 frames concatenate cleanly, so chunk payloads are appended as-is.
        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let bytes = self.generate_chunk(chunk, voice).map_err(|e| {
                StoryError::synthesis(format!("chunk {}/{}: {e}", i + 1, chunks.len()))
            })?;
            audio.extend_from_slice(&bytes);
        }

        crate::encode::ffmpeg::ensure_parent_dir(out)?;
        std::fs::write(out, &audio).map_err(|e| {
            StoryError::synthesis(format!("failed to write '{}': {e}", out.display()))
        })?;
        Ok(out.to_path_buf())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/tiktok.rs"]
mod tests;
