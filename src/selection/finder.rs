use rand::Rng;

use crate::foundation::error::{StoryError, StoryResult};
use crate::history::store::HistoryStore;
use crate::selection::filter::QualityFilter;
use crate::selection::model::{CandidateItem, StoryPackage};
use crate::selection::selector::Selector;
use crate::source::{ContentSource, FETCH_STRATEGIES, FetchStrategy, StoryGroup};

/// Pool gathered from one community across all fetch strategies.
#[derive(Debug, Default)]
pub struct CollectedPool {
    pub candidates: Vec<CandidateItem>,
    /// Raw items returned before filtering.
    pub fetched: usize,
    pub failed_strategies: usize,
}

/// Runs the fetch sweep for a story group and hands the pooled candidates to the [`Selector`].
pub struct StoryFinder<'a, S: ContentSource> {
    source: S,
    history: &'a HistoryStore,
    filter: QualityFilter,
    strategies: &'a [FetchStrategy],
}

impl<'a, S: ContentSource> StoryFinder<'a, S> {
    pub fn new(source: S, history: &'a HistoryStore, filter: QualityFilter) -> Self {
        Self {
            source,
            history,
            filter,
            strategies: &FETCH_STRATEGIES,
        }
    }

    pub fn with_strategies(mut self, strategies: &'a [FetchStrategy]) -> Self {
        self.strategies = strategies;
        self
    }

    /// Fetch every strategy for `community`, filtering each batch. Failed strategies are skipped.
    pub fn collect_pool(&self, community: &str) -> CollectedPool {
        let mut pool = CollectedPool::default();
        for strategy in self.strategies {
            match self
                .source
                .fetch(community, strategy.sort, strategy.window, strategy.limit)
            {
                Ok(items) => {
                    pool.fetched += items.len();
                    let (kept, report) = self.filter.apply(items);
                    tracing::info!(
                        community,
                        strategy = strategy.label,
                        kept = report.kept,
                        "collected quality posts"
                    );
                    pool.candidates.extend(kept);
                }
                Err(e) => {
                    pool.failed_strategies += 1;
                    tracing::warn!(community, strategy = strategy.label, error = %e, "fetch strategy failed");
                }
            }
        }
        pool
    }

    /// Try each community of `group` in order; the first selection wins.
    ///
    /// Returns `Ok(None)` when items were fetched but nothing was selectable, and
    /// `SourceUnavailable` when no community returned anything at all.
    pub fn find<R: Rng + ?Sized>(
        &self,
        group: &StoryGroup,
        rng: &mut R,
    ) -> StoryResult<Option<StoryPackage>> {
        let mut fetched_any = false;
        for community in group.subreddits {
            tracing::info!(community, "searching community");
            let pool = self.collect_pool(community);
            if pool.fetched == 0 {
                continue;
            }
            fetched_any = true;

            let used = self.history.load_used();
            let blacklisted = self.history.load_blacklisted();
            if let Some(item) =
                Selector::new(self.history).select(pool.candidates, &used, &blacklisted, rng)
            {
                let story = StoryPackage::from_candidate(item);
                tracing::info!(
                    community,
                    title = %story.title,
                    score = story.score,
                    duration_secs = story.estimated_duration_seconds,
                    "picked story"
                );
                return Ok(Some(story));
            }
            tracing::info!(community, "no selectable stories");
        }

        if !fetched_any {
            return Err(StoryError::source_unavailable(format!(
                "no items returned for '{}' from any community or strategy",
                group.name
            )));
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/finder.rs"]
mod tests;
