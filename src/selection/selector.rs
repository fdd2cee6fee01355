use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::history::store::HistoryStore;
use crate::selection::model::CandidateItem;

/// Tiered engagement weight: 3x at 100+, 2x at 50+, 1.5x at 20+, 1x below.
pub fn score_weight(score: i64) -> f64 {
    let s = score as f64;
    if score >= 100 {
        3.0 * s
    } else if score >= 50 {
        2.0 * s
    } else if score >= 20 {
        1.5 * s
    } else {
        s
    }
}

/// Collapse repeated ids; the last occurrence's data wins at the first occurrence's position.
pub fn dedup_by_id(pool: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(pool.len());
    let mut out: Vec<CandidateItem> = Vec::with_capacity(pool.len());
    for item in pool {
        match slots.get(&item.id) {
            Some(&idx) => out[idx] = item,
            None => {
                slots.insert(item.id.clone(), out.len());
                out.push(item);
            }
        }
    }
    out
}

/// One categorical draw proportional to [`score_weight`]. Non-positive weights never win.
pub fn weighted_pick<'a, R: Rng + ?Sized>(
    items: &'a [CandidateItem],
    rng: &mut R,
) -> Option<&'a CandidateItem> {
    let eligible: Vec<(&CandidateItem, f64)> = items
        .iter()
        .map(|item| (item, score_weight(item.score)))
        .filter(|(_, w)| w.is_finite() && *w > 0.0)
        .collect();
    let dist = WeightedIndex::new(eligible.iter().map(|(_, w)| *w)).ok()?;
    Some(eligible[dist.sample(rng)].0)
}

/// Fresh-pool selection with automatic history reset.
pub struct Selector<'h> {
    history: &'h HistoryStore,
}

impl<'h> Selector<'h> {
    pub fn new(history: &'h HistoryStore) -> Self {
        Self { history }
    }

    /// Pick one candidate that is neither used nor blacklisted and mark it used.
    ///
    /// When every candidate has been used, the used history is reset and the pool minus the
    /// blacklist is drawn from instead. An empty pool counts as fully used: history is reset and
    /// `None` is returned.
    pub fn select<R: Rng + ?Sized>(
        &self,
        pool: Vec<CandidateItem>,
        used: &HashSet<String>,
        blacklisted: &HashSet<String>,
        rng: &mut R,
    ) -> Option<CandidateItem> {
        let pool = dedup_by_id(pool);
        let mut fresh: Vec<CandidateItem> = pool
            .iter()
            .filter(|c| !used.contains(&c.id) && !blacklisted.contains(&c.id))
            .cloned()
            .collect();
        tracing::info!(
            fresh = fresh.len(),
            total = pool.len(),
            used = used.len(),
            blacklisted = blacklisted.len(),
            "computed fresh pool"
        );

        if fresh.is_empty() {
            tracing::info!("all candidates already used; clearing history");
            let outcome = self.history.reset_used();
            if outcome.is_failure() {
                tracing::warn!(?outcome, "could not clear used story history");
            }
            fresh = pool
                .into_iter()
                .filter(|c| !blacklisted.contains(&c.id))
                .collect();
        }
        if fresh.is_empty() {
            return None;
        }

        log_score_spread(&fresh);
        let picked = weighted_pick(&fresh, rng)?.clone();

        let total: f64 = fresh.iter().map(|c| score_weight(c.score).max(0.0)).sum();
        tracing::info!(
            id = %picked.id,
            score = picked.score,
            probability = score_weight(picked.score) / total,
            "selected story"
        );
        let outcome = self.history.mark_used(&picked.id);
        if outcome.is_failure() {
            tracing::warn!(id = %picked.id, ?outcome, "could not persist story usage");
        }
        Some(picked)
    }
}

fn log_score_spread(fresh: &[CandidateItem]) {
    let mut scores: Vec<i64> = fresh.iter().map(|c| c.score).collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    let (Some(max), Some(min)) = (scores.first().copied(), scores.last().copied()) else {
        return;
    };
    scores.truncate(5);
    tracing::info!(min, max, top = ?scores, "quality spread of fresh pool");
}

#[cfg(test)]
#[path = "../../tests/unit/selection/selector.rs"]
mod tests;
