use crate::selection::duration::{MAX_NARRATION_SECS, fits_ceiling, story_duration_seconds};
use crate::selection::model::CandidateItem;

pub const MIN_BODY_CHARS: usize = 100;
pub const MAX_BODY_CHARS: usize = 3000;
pub const MAX_TOTAL_CHARS: usize = 3200;
pub const MIN_SCORE: i64 = 10;

const UPDATE_PREFIXES: [&str; 14] = [
    "update:",
    "update -",
    "update—",
    "update –",
    "[update]",
    "(update)",
    "final update",
    "small update",
    "quick update",
    "mini update",
    "brief update",
    "edit:",
    "part 2",
    "part 3",
];

/// How far into a title a bare "update" still marks a continuation post.
const UPDATE_SCAN_CHARS: usize = 20;

/// Why a candidate was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    EmptyBody,
    BodyLength,
    TotalLength,
    Stickied,
    LowScore,
    UpdatePost,
    OverBudget,
}

/// `true` for update/continuation titles, which make no sense without the earlier post.
pub fn is_update_post(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    if UPDATE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    let head: String = lower.chars().take(UPDATE_SCAN_CHARS).collect();
    head.contains("update")
}

/// Per-candidate quality and duration gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityFilter {
    pub max_duration_secs: f64,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self {
            max_duration_secs: MAX_NARRATION_SECS,
        }
    }
}

/// Counts from one filtering pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub kept: usize,
    pub quality: usize,
    pub updates: usize,
    pub over_budget: usize,
}

impl QualityFilter {
    pub fn new(max_duration_secs: f64) -> Self {
        Self { max_duration_secs }
    }

    /// Quality checks first, then the continuation check, then the duration ceiling.
    pub fn check(&self, item: &CandidateItem) -> Result<(), Rejection> {
        if item.body.is_empty() {
            return Err(Rejection::EmptyBody);
        }
        let body_chars = item.body.chars().count();
        if body_chars <= MIN_BODY_CHARS || body_chars >= MAX_BODY_CHARS {
            return Err(Rejection::BodyLength);
        }
        if item.title.chars().count() + body_chars >= MAX_TOTAL_CHARS {
            return Err(Rejection::TotalLength);
        }
        if item.stickied {
            return Err(Rejection::Stickied);
        }
        if item.score < MIN_SCORE {
            return Err(Rejection::LowScore);
        }
        if is_update_post(&item.title) {
            return Err(Rejection::UpdatePost);
        }
        if !fits_ceiling(
            story_duration_seconds(&item.title, &item.body),
            self.max_duration_secs,
        ) {
            return Err(Rejection::OverBudget);
        }
        Ok(())
    }

    /// Drop every candidate that fails [`QualityFilter::check`]; order is preserved.
    pub fn apply(&self, items: Vec<CandidateItem>) -> (Vec<CandidateItem>, FilterReport) {
        let mut report = FilterReport::default();
        let kept: Vec<CandidateItem> = items
            .into_iter()
            .filter(|item| match self.check(item) {
                Ok(()) => true,
                Err(Rejection::UpdatePost) => {
                    report.updates += 1;
                    false
                }
                Err(Rejection::OverBudget) => {
                    report.over_budget += 1;
                    false
                }
                Err(_) => {
                    report.quality += 1;
                    false
                }
            })
            .collect();
        report.kept = kept.len();
        if report.updates > 0 {
            tracing::info!(count = report.updates, "filtered out update posts");
        }
        (kept, report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/filter.rs"]
mod tests;
