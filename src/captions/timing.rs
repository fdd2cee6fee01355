use crate::selection::duration::estimate_duration_seconds;

/// A sentence only closes once its trimmed text is longer than this.
pub const SENTENCE_MIN_CHARS: usize = 10;
/// Captions longer than this are shown as two halves.
pub const MAX_CAPTION_CHARS: usize = 60;
pub const FALLBACK_CHUNK_WORDS: usize = 7;
pub const FALLBACK_CHUNK_CHARS: usize = 45;
/// Allowed gap between the last caption end and the narration length.
pub const CAPTION_TOLERANCE_SECS: f64 = 2.0;

/// Words before which a caption reads naturally when split.
const CONNECTIVES: [&str; 5] = ["and", "but", "so", "then", "because"];
/// How many word positions around the midpoint are probed for a natural break.
const SPLIT_SEARCH_WORDS: isize = 5;

/// A caption and the half-open interval it is shown for.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionUnit {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// `true` for either half of a split long caption.
    #[serde(default)]
    pub split: bool,
}

impl CaptionUnit {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Visible at `t` when `start <= t < end`.
    pub fn is_visible_at(&self, t: f64) -> bool {
        self.start_seconds <= t && t < self.end_seconds
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split narration into sentences on `.`, `!` and `?`, ignoring terminators in short fragments.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut buf = String::new();
    for ch in text.chars() {
        buf.push(ch);
        if matches!(ch, '.' | '!' | '?') && char_len(buf.trim()) > SENTENCE_MIN_CHARS {
            sentences.push(buf.trim().to_string());
            buf.clear();
        }
    }
    let rest = buf.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Give each sentence a share of `audio_duration` proportional to its character count.
///
/// The final unit ends at `audio_duration` exactly. Empty input or a non-positive duration
/// yields no units.
pub fn allocate_timings(sentences: &[String], audio_duration: f64) -> Vec<CaptionUnit> {
    let total: usize = sentences.iter().map(|s| char_len(s)).sum();
    if total == 0 || !audio_duration.is_finite() || audio_duration <= 0.0 {
        return Vec::new();
    }

    let last = sentences.len() - 1;
    let mut start = 0.0f64;
    let mut units = Vec::with_capacity(sentences.len());
    for (i, sentence) in sentences.iter().enumerate() {
        let share = audio_duration * (char_len(sentence) as f64 / total as f64);
        let end = if i == last {
            audio_duration
        } else {
            start + share
        };
        units.push(CaptionUnit {
            text: sentence.clone(),
            start_seconds: start,
            end_seconds: end,
            split: false,
        });
        start = end;
    }
    units
}

fn is_natural_break(word: &str) -> bool {
    word.ends_with(['.', '!', '?', ',']) || CONNECTIVES.contains(&word)
}

/// Split a caption longer than `max_chars` into exactly two parts; shorter text is returned as is.
///
/// Breaks after the first punctuation-ending or connective word found scanning outward from the
/// middle word, otherwise at the middle word. A single long word splits at its middle character.
pub fn split_long_caption(text: &str, max_chars: usize) -> Vec<String> {
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.len() < 2 {
            return vec![text.to_string()];
        }
        let mid = chars.len() / 2;
        return vec![
            chars[..mid].iter().collect(),
            chars[mid..].iter().collect(),
        ];
    }

    let mid = words.len() / 2;
    for offset in 0..SPLIT_SEARCH_WORDS {
        for direction in [-1isize, 1] {
            let idx = mid as isize + offset * direction;
            if idx < 0 || idx as usize >= words.len() {
                continue;
            }
            let idx = idx as usize;
            if is_natural_break(words[idx]) && idx + 1 < words.len() {
                return vec![words[..=idx].join(" "), words[idx + 1..].join(" ")];
            }
        }
    }
    vec![words[..mid].join(" "), words[mid..].join(" ")]
}

/// Replace each over-long unit with two contiguous half-duration units.
pub fn expand_long_units(units: Vec<CaptionUnit>, max_chars: usize) -> Vec<CaptionUnit> {
    let mut out = Vec::with_capacity(units.len());
    for unit in units {
        let mut parts = split_long_caption(&unit.text, max_chars);
        if parts.len() != 2 {
            out.push(unit);
            continue;
        }
        let mid = unit.start_seconds + unit.duration_seconds() / 2.0;
        let second = parts.pop().unwrap_or_default();
        let first = parts.pop().unwrap_or_default();
        out.push(CaptionUnit {
            text: first,
            start_seconds: unit.start_seconds,
            end_seconds: mid,
            split: true,
        });
        out.push(CaptionUnit {
            text: second,
            start_seconds: mid,
            end_seconds: unit.end_seconds,
            split: true,
        });
    }
    out
}

/// Captions timed against the measured narration length.
pub fn timed_captions(text: &str, audio_duration: f64, max_chars: usize) -> Vec<CaptionUnit> {
    let sentences = segment_sentences(text);
    expand_long_units(allocate_timings(&sentences, audio_duration), max_chars)
}

/// Group words into short chunks: at most [`FALLBACK_CHUNK_WORDS`] words, closing early once the
/// chunk passes [`FALLBACK_CHUNK_CHARS`] characters.
pub fn chunk_words(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        let joined_len =
            current.iter().map(|w| char_len(w)).sum::<usize>() + current.len().saturating_sub(1);
        if current.len() >= FALLBACK_CHUNK_WORDS || joined_len > FALLBACK_CHUNK_CHARS {
            chunks.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Evenly timed word chunks, for when the narration length cannot be measured.
pub fn estimated_captions(text: &str, total_duration: f64, max_chars: usize) -> Vec<CaptionUnit> {
    let chunks = chunk_words(text);
    if chunks.is_empty() || !total_duration.is_finite() || total_duration <= 0.0 {
        return Vec::new();
    }
    let per_chunk = total_duration / chunks.len() as f64;
    let last = chunks.len() - 1;
    let units = chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| CaptionUnit {
            text,
            start_seconds: i as f64 * per_chunk,
            end_seconds: if i == last {
                total_duration
            } else {
                (i + 1) as f64 * per_chunk
            },
            split: false,
        })
        .collect();
    expand_long_units(units, max_chars)
}

/// [`estimated_captions`] over the words-per-minute estimate of `text`.
pub fn fallback_captions(text: &str, max_chars: usize) -> Vec<CaptionUnit> {
    estimated_captions(text, estimate_duration_seconds(text), max_chars)
}

/// How far the final caption end is from the narration length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionAccuracy {
    pub drift_seconds: f64,
    pub within_tolerance: bool,
}

/// `None` when there are no captions to check.
pub fn check_caption_accuracy(units: &[CaptionUnit], audio_duration: f64) -> Option<CaptionAccuracy> {
    let last_end = units
        .iter()
        .map(|u| u.end_seconds)
        .fold(None, |acc: Option<f64>, e| Some(acc.map_or(e, |a| a.max(e))))?;
    let drift_seconds = (last_end - audio_duration).abs();
    Some(CaptionAccuracy {
        drift_seconds,
        within_tolerance: drift_seconds <= CAPTION_TOLERANCE_SECS,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/captions/timing.rs"]
mod tests;
