use std::path::PathBuf;
use std::rc::Rc;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::foundation::clock::{Clock, SystemClock};
use crate::history::json_file::{read_json_or_default, write_json_atomic};
use crate::history::store::PersistOutcome;

/// A narration voice and its relative pick weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceChoice {
    pub id: &'static str,
    pub label: &'static str,
    pub weight: u32,
}

/// Voices offered by the primary narration backend.
pub const NARRATION_VOICES: [VoiceChoice; 5] = [
    VoiceChoice {
        id: "en_male_narration",
        label: "Story Teller",
        weight: 35,
    },
    VoiceChoice {
        id: "en_us_007",
        label: "Professor",
        weight: 25,
    },
    VoiceChoice {
        id: "en_us_009",
        label: "Scientist",
        weight: 20,
    },
    VoiceChoice {
        id: "en_us_006",
        label: "Joey",
        weight: 15,
    },
    VoiceChoice {
        id: "en_us_ghostface",
        label: "Ghost Face",
        weight: 5,
    },
];

/// Human readable name for a voice id; unknown ids map to themselves.
pub fn voice_label(id: &str) -> &str {
    NARRATION_VOICES
        .iter()
        .find(|v| v.id == id)
        .map(|v| v.label)
        .unwrap_or(id)
}

/// Weighted draw over `voices`, skipping `last` unless it is the only option.
pub fn pick_voice<R: Rng + ?Sized>(
    voices: &[VoiceChoice],
    last: Option<&str>,
    rng: &mut R,
) -> Option<&'static str> {
    let mut candidates: Vec<&VoiceChoice> = voices
        .iter()
        .filter(|v| v.weight > 0 && Some(v.id) != last)
        .collect();
    if candidates.is_empty() {
        candidates = voices.iter().filter(|v| v.weight > 0).collect();
    }
    let dist = WeightedIndex::new(candidates.iter().map(|v| v.weight)).ok()?;
    Some(candidates[dist.sample(rng)].id)
}

/// Single-slot record of the previous run's voice.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VoiceSelectionState {
    #[serde(default)]
    pub last_voice: Option<String>,
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Clone)]
pub struct VoiceStore {
    path: PathBuf,
    clock: Rc<dyn Clock>,
}

impl VoiceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clock: Rc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn load_last_voice(&self) -> Option<String> {
        match read_json_or_default::<VoiceSelectionState>(&self.path) {
            Ok(state) => state.last_voice,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %format!("{e:#}"), "ignoring unreadable voice state");
                None
            }
        }
    }

    pub fn save_last_voice(&self, voice: &str) -> PersistOutcome {
        let state = VoiceSelectionState {
            last_voice: Some(voice.to_string()),
            timestamp: self.clock.now_epoch_secs(),
        };
        match write_json_atomic(&self.path, &state) {
            Ok(()) => PersistOutcome::Written,
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(path = %self.path.display(), %reason, "voice state write failed");
                PersistOutcome::Failed { reason }
            }
        }
    }

    /// Pick the next voice (avoiding the previous one) and persist the choice.
    pub fn choose_next<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        let last = self.load_last_voice();
        let voice = pick_voice(&NARRATION_VOICES, last.as_deref(), rng)?;
        tracing::info!(voice, label = voice_label(voice), previous = ?last, "selected narration voice");
        let outcome = self.save_last_voice(voice);
        if outcome.is_failure() {
            tracing::warn!(voice, ?outcome, "could not persist narration voice");
        }
        Some(voice)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/voice.rs"]
mod tests;
