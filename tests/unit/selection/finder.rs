use super::*;
use crate::source::{SortMode, TimeWindow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::collections::HashMap;

struct FakeSource {
    items: HashMap<&'static str, Vec<CandidateItem>>,
    failing: Vec<&'static str>,
    calls: RefCell<Vec<(String, SortMode)>>,
}

impl ContentSource for FakeSource {
    fn fetch(
        &self,
        group: &str,
        sort: SortMode,
        _window: Option<TimeWindow>,
        limit: usize,
    ) -> StoryResult<Vec<CandidateItem>> {
        self.calls.borrow_mut().push((group.to_string(), sort));
        if self.failing.contains(&group) {
            return Err(StoryError::source_unavailable("boom"));
        }
        Ok(self
            .items
            .get(group)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

fn good(id: &str, community: &str, score: i64) -> CandidateItem {
    CandidateItem {
        id: id.to_string(),
        title: format!("A story {id}"),
        body: "word ".repeat(60),
        score,
        comment_count: 3,
        permalink: format!("/r/{community}/comments/{id}"),
        source_group: community.to_string(),
        stickied: false,
    }
}

const GROUP: StoryGroup = StoryGroup {
    name: "Test",
    slug: "test",
    subreddits: &["first", "second"],
    blurb: "",
};

fn history(dir: &std::path::Path) -> HistoryStore {
    HistoryStore::new(dir.join("used.json"), dir.join("blacklist.json"))
}

#[test]
fn sweeps_every_strategy_and_builds_package() {
    let dir = tempfile::tempdir().unwrap();
    let store = history(dir.path());
    let source = FakeSource {
        items: HashMap::from([("first", vec![good("a", "first", 40)])]),
        failing: vec![],
        calls: RefCell::new(Vec::new()),
    };
    let finder = StoryFinder::new(&source, &store, QualityFilter::default());
    let story = finder
        .find(&GROUP, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .unwrap();

    assert_eq!(story.id, "a");
    assert_eq!(story.url, "https://reddit.com/r/first/comments/a");
    assert_eq!(story.estimated_duration_seconds, (60.0 + 3.0) / 3.0);
    assert_eq!(source.calls.borrow().len(), FETCH_STRATEGIES.len());
    assert!(store.load_used().contains("a"));
}

#[test]
fn falls_through_to_next_community() {
    let dir = tempfile::tempdir().unwrap();
    let store = history(dir.path());
    store.mark_blacklisted("a", "blocked");
    let source = FakeSource {
        items: HashMap::from([
            ("first", vec![good("a", "first", 40)]),
            ("second", vec![good("b", "second", 40)]),
        ]),
        failing: vec![],
        calls: RefCell::new(Vec::new()),
    };
    let finder = StoryFinder::new(&source, &store, QualityFilter::default());
    let story = finder
        .find(&GROUP, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .unwrap();
    assert_eq!(story.id, "b");
    assert_eq!(story.source_group, "second");
}

#[test]
fn nothing_fetched_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = history(dir.path());
    let source = FakeSource {
        items: HashMap::new(),
        failing: vec!["first"],
        calls: RefCell::new(Vec::new()),
    };
    let finder = StoryFinder::new(&source, &store, QualityFilter::default());
    let err = finder
        .find(&GROUP, &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert!(matches!(err, StoryError::SourceUnavailable(_)));
}

#[test]
fn fetched_but_unselectable_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = history(dir.path());
    store.mark_used("old");
    let mut low = good("a", "first", 2);
    low.id = "low".into();
    let source = FakeSource {
        items: HashMap::from([("first", vec![low])]),
        failing: vec![],
        calls: RefCell::new(Vec::new()),
    };
    let finder = StoryFinder::new(&source, &store, QualityFilter::default());
    assert!(
        finder
            .find(&GROUP, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .is_none()
    );
    assert!(store.load_used().is_empty());
}

#[test]
fn custom_strategy_list_limits_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let store = history(dir.path());
    let source = FakeSource {
        items: HashMap::from([("first", vec![good("a", "first", 40)])]),
        failing: vec![],
        calls: RefCell::new(Vec::new()),
    };
    let hot_only = [FetchStrategy {
        sort: SortMode::Hot,
        window: None,
        limit: 10,
        label: "hot posts",
    }];
    let finder =
        StoryFinder::new(&source, &store, QualityFilter::default()).with_strategies(&hot_only);
    let story = finder
        .find(&GROUP, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .unwrap();

    assert_eq!(story.id, "a");
    assert_eq!(
        source.calls.borrow().as_slice(),
        &[("first".to_string(), SortMode::Hot)]
    );
}
