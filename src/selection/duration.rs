/// Spoken rate of the narration at its applied tempo.
pub const WORDS_PER_MINUTE: f64 = 180.0;

/// Hard ceiling on estimated narration length (2 min 50 s).
pub const MAX_NARRATION_SECS: f64 = 170.0;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn words_to_seconds(words: usize) -> f64 {
    // Multiply first so whole-second budgets stay exact (510 words is exactly 170.0 s).
    words as f64 * 60.0 / WORDS_PER_MINUTE
}

pub fn estimate_duration_seconds(text: &str) -> f64 {
    words_to_seconds(word_count(text))
}

/// Estimated narration length of a titled story (`title + " " + body`).
pub fn story_duration_seconds(title: &str, body: &str) -> f64 {
    words_to_seconds(word_count(title) + word_count(body))
}

pub fn fits_ceiling(estimated_secs: f64, ceiling_secs: f64) -> bool {
    estimated_secs <= ceiling_secs
}

/// `true` when the story's estimate is within [`MAX_NARRATION_SECS`].
pub fn is_within_budget(title: &str, body: &str) -> bool {
    fits_ceiling(story_duration_seconds(title, body), MAX_NARRATION_SECS)
}

#[cfg(test)]
#[path = "../../tests/unit/selection/duration.rs"]
mod tests;
