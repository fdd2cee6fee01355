use super::*;
use crate::narration::NarrationBackend;
use crate::selection::model::CandidateItem;
use crate::source::{SortMode, TimeWindow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::path::Path;

struct FixedSource {
    items: Vec<CandidateItem>,
}

impl ContentSource for FixedSource {
    fn fetch(
        &self,
        group: &str,
        _sort: SortMode,
        _window: Option<TimeWindow>,
        _limit: usize,
    ) -> StoryResult<Vec<CandidateItem>> {
        Ok(self
            .items
            .iter()
            .filter(|c| c.source_group == group)
            .cloned()
            .collect())
    }
}

struct DeadBackend;

impl NarrationBackend for DeadBackend {
    fn name(&self) -> &str {
        "dead"
    }

    fn synthesize(&self, _text: &str, _voice: &str, _out: &Path) -> StoryResult<PathBuf> {
        Err(StoryError::synthesis("offline"))
    }
}

struct ScriptedHost {
    group: Option<usize>,
    reviews: VecDeque<Review>,
    seen: Vec<StoryPreview>,
}

impl ScriptedHost {
    fn new(group: Option<usize>, reviews: &[Review]) -> Self {
        Self {
            group,
            reviews: reviews.iter().copied().collect(),
            seen: Vec::new(),
        }
    }
}

impl StoryHost for ScriptedHost {
    fn choose_group(&mut self, groups: &[StoryGroup]) -> Option<usize> {
        assert_eq!(groups.len(), 3);
        self.group
    }

    fn review(&mut self, story: &StoryPackage, preview: &StoryPreview) -> Review {
        assert_eq!(story.title, preview.title);
        self.seen.push(preview.clone());
        self.reviews.pop_front().unwrap_or(Review::Quit)
    }
}

fn candidate(id: &str, community: &str, score: i64) -> CandidateItem {
    CandidateItem {
        id: id.to_string(),
        title: format!("Story {id}"),
        body: "Something happened today. ".repeat(8),
        score,
        comment_count: 12,
        permalink: format!("/r/{community}/comments/{id}"),
        source_group: community.to_string(),
        stickied: false,
    }
}

fn pipeline(dir: &Path, items: Vec<CandidateItem>) -> Pipeline<FixedSource> {
    let mut config = StoryConfig::default();
    config.state.used_path = dir.join("used.json");
    config.state.blacklist_path = dir.join("blacklist.json");
    config.state.voice_path = dir.join("voice.json");
    config.media.narration_path = dir.join("narration.mp3");
    config.media.output_root = dir.join("out");
    let history = HistoryStore::from_config(&config.state);
    let voices = VoiceStore::new(&config.state.voice_path);
    let narrator = Narrator::new(Box::new(DeadBackend), Box::new(DeadBackend), "fallback");
    let composer = VideoComposer::new(ComposeSettings::default(), None);
    Pipeline::new(config, FixedSource { items }, history, voices, narrator, composer)
}

#[test]
fn declining_group_quits() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = pipeline(dir.path(), vec![]);
    let mut host = ScriptedHost::new(None, &[]);
    let out = p.run(&mut host, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(out, RunOutcome::Quit);
}

#[test]
fn quit_during_review_leaves_blacklist_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = pipeline(dir.path(), vec![candidate("a", "AmItheAsshole", 50)]);
    let mut host = ScriptedHost::new(Some(1), &[Review::Quit]);
    let out = p.run(&mut host, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(out, RunOutcome::Quit);
    assert_eq!(host.seen.len(), 1);
    assert!(p.history().load_blacklisted().is_empty());
    assert!(p.history().load_used().contains("a"));
}

#[test]
fn rejecting_last_story_exhausts_group() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = pipeline(dir.path(), vec![candidate("a", "nosleep", 50)]);
    let mut host = ScriptedHost::new(Some(2), &[Review::Reject]);
    let out = p.run(&mut host, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(out, RunOutcome::NoStory);
    assert!(p.history().load_blacklisted().contains("a"));
}

#[test]
fn approved_story_fails_when_narration_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let items = vec![
        candidate("a", "TrueOffMyChest", 50),
        candidate("b", "TrueOffMyChest", 60),
    ];
    let mut p = pipeline(dir.path(), items);
    let mut host = ScriptedHost::new(Some(0), &[Review::Reject, Review::Approve]);
    let err = p.run(&mut host, &mut StdRng::seed_from_u64(9)).unwrap_err();
    assert!(matches!(err, StoryError::SynthesisFailure(_)), "{err:?}");

    assert_eq!(host.seen.len(), 2);
    let rejected = &host.seen[0];
    let approved = &host.seen[1];
    assert_ne!(rejected.url, approved.url);
    assert_eq!(p.history().load_blacklisted().len(), 1);
    assert_eq!(p.history().load_used().len(), 2);
    // The voice is committed before narration is attempted.
    assert!(dir.path().join("voice.json").is_file());
}

#[test]
fn preview_truncates_body_and_flags_ceiling() {
    let mut item = candidate("a", "AITA", 10);
    item.body = "x".repeat(400);
    let story = StoryPackage::from_candidate(item);
    let preview = StoryPreview::new(&story, 170.0);
    assert_eq!(preview.body_preview.chars().count(), PREVIEW_BODY_CHARS + 3);
    assert!(preview.body_preview.ends_with("..."));
    assert!(preview.fits_ceiling);
    assert_eq!(preview.comment_count, 12);

    let tight = StoryPreview::new(&story, 0.1);
    assert!(!tight.fits_ceiling);
}

#[test]
fn caption_plan_uses_audio_length_when_known() {
    let text = "First sentence is here. Second sentence is longer than that.";
    let plan = plan_captions(text, Some(12.0), 60);
    assert!(plan.audio_timed);
    let last = plan.units.last().unwrap();
    assert!((last.end_seconds - 12.0).abs() < 1e-6);
    assert_eq!(plan.units[0].start_seconds, 0.0);
}

#[test]
fn caption_plan_estimates_without_audio_length() {
    let text = "one two three four five six seven eight nine ten";
    let plan = plan_captions(text, None, 60);
    assert!(!plan.audio_timed);
    assert_eq!(plan.units.len(), 2);
    assert!(plan.units.iter().all(|u| !u.text.is_empty()));

    let zero = plan_captions(text, Some(0.0), 60);
    assert!(!zero.audio_timed);
}
