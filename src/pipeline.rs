//! One end-to-end run: pick a story, get it approved, narrate, caption and compose it.

use std::path::PathBuf;

use rand::Rng;

use crate::captions::render::CaptionRenderer;
use crate::captions::timing::{
    CaptionUnit, check_caption_accuracy, fallback_captions, timed_captions,
};
use crate::compose::composer::{ComposeRequest, ComposeSettings, ComposedVideo, VideoComposer};
use crate::foundation::config::StoryConfig;
use crate::foundation::error::{StoryError, StoryResult};
use crate::history::store::HistoryStore;
use crate::history::voice::{NARRATION_VOICES, VoiceStore, voice_label};
use crate::media::probe::probe_duration;
use crate::naming::output_path;
use crate::narration::edge::EdgeTtsCommand;
use crate::narration::tiktok::TikTokTts;
use crate::narration::{NarrationOutput, Narrator};
use crate::selection::duration::{fits_ceiling, story_duration_seconds};
use crate::selection::filter::QualityFilter;
use crate::selection::finder::StoryFinder;
use crate::selection::model::StoryPackage;
use crate::source::reddit::RedditSource;
use crate::source::{ContentSource, STORY_GROUPS, StoryGroup};

/// Characters of body text shown when asking for approval.
pub const PREVIEW_BODY_CHARS: usize = 300;

/// Host decision on a proposed story.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Review {
    Approve,
    /// Blacklist the story and propose another one.
    Reject,
    Quit,
}

/// Interactive capabilities the pipeline needs from whoever drives it.
pub trait StoryHost {
    /// Index into `groups`, or `None` to stop.
    fn choose_group(&mut self, groups: &[StoryGroup]) -> Option<usize>;
    /// Decide on `story`; `preview` carries the display fields.
    fn review(&mut self, story: &StoryPackage, preview: &StoryPreview) -> Review;
}

/// What a host shows before approval.
#[derive(Clone, Debug, PartialEq)]
pub struct StoryPreview {
    pub title: String,
    pub score: i64,
    pub comment_count: u64,
    pub url: String,
    pub body_preview: String,
    pub estimated_duration_seconds: f64,
    pub fits_ceiling: bool,
}

impl StoryPreview {
    pub fn new(story: &StoryPackage, ceiling_secs: f64) -> Self {
        Self {
            title: story.title.clone(),
            score: story.score,
            comment_count: story.comment_count,
            url: story.url.clone(),
            body_preview: story.body_preview(PREVIEW_BODY_CHARS),
            estimated_duration_seconds: story.estimated_duration_seconds,
            fits_ceiling: fits_ceiling(story.estimated_duration_seconds, ceiling_secs),
        }
    }
}

/// Result of the approval loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Approval {
    Approved(StoryPackage),
    Quit,
    /// Nothing selectable was left to propose.
    Exhausted,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Rendered(ComposedVideo),
    /// The host stopped before anything was rendered.
    Quit,
    /// Nothing selectable was left in the chosen group.
    NoStory,
}

/// Captions for a narration and how they were timed.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionPlan {
    pub units: Vec<CaptionUnit>,
    /// `false` when the narration length was unknown and timing is estimated.
    pub audio_timed: bool,
}

/// Build captions from the measured narration length, or estimate them when it is unknown.
pub fn plan_captions(text: &str, narration_secs: Option<f64>, max_chars: usize) -> CaptionPlan {
    let Some(duration) = narration_secs.filter(|d| d.is_finite() && *d > 0.0) else {
        tracing::warn!("narration length unknown; using estimated caption timing");
        return CaptionPlan {
            units: fallback_captions(text, max_chars),
            audio_timed: false,
        };
    };

    let units = timed_captions(text, duration, max_chars);
    if units.is_empty() {
        tracing::warn!("no sentences found; using estimated caption timing");
        return CaptionPlan {
            units: fallback_captions(text, max_chars),
            audio_timed: false,
        };
    }
    match check_caption_accuracy(&units, duration) {
        Some(acc) if acc.within_tolerance => {
            tracing::info!(drift_secs = acc.drift_seconds, "caption timing within tolerance")
        }
        Some(acc) => tracing::warn!(drift_secs = acc.drift_seconds, "caption timing drifted"),
        None => {}
    }
    CaptionPlan {
        units,
        audio_timed: true,
    }
}

/// Wires source, history, voices, narration and composition together.
pub struct Pipeline<S: ContentSource> {
    config: StoryConfig,
    source: S,
    history: HistoryStore,
    voices: VoiceStore,
    narrator: Narrator,
    composer: VideoComposer,
}

impl Pipeline<RedditSource> {
    /// Production wiring: Reddit listings, TikTok voice with `edge-tts` fallback, system fonts.
    pub fn from_config(config: StoryConfig) -> StoryResult<Self> {
        config.validate()?;
        let source = RedditSource::new(&config.source)?;
        let narrator = Narrator::new(
            Box::new(TikTokTts::new(&config.narration)?),
            Box::new(EdgeTtsCommand::from_config(&config.narration)),
            config.narration.fallback_voice.clone(),
        );
        let renderer =
            CaptionRenderer::from_system(&config.captions.font_dirs, config.captions.font_size_px);
        let composer = VideoComposer::new(ComposeSettings::from_config(&config.compose)?, renderer);
        let history = HistoryStore::from_config(&config.state);
        let voices = VoiceStore::new(&config.state.voice_path);
        Ok(Self::new(config, source, history, voices, narrator, composer))
    }
}

impl<S: ContentSource> Pipeline<S> {
    pub fn new(
        config: StoryConfig,
        source: S,
        history: HistoryStore,
        voices: VoiceStore,
        narrator: Narrator,
        composer: VideoComposer,
    ) -> Self {
        Self {
            config,
            source,
            history,
            voices,
            narrator,
            composer,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run once against the fixed story groups.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        host: &mut dyn StoryHost,
        rng: &mut R,
    ) -> StoryResult<RunOutcome> {
        let groups: &'static [StoryGroup] = &STORY_GROUPS;
        let Some(group) = host.choose_group(groups).and_then(|i| groups.get(i)) else {
            return Ok(RunOutcome::Quit);
        };
        tracing::info!(group = group.name, communities = ?group.subreddits, "group selected");

        let story = match self.approve_story(group, host, rng)? {
            Approval::Approved(story) => story,
            Approval::Quit => return Ok(RunOutcome::Quit),
            Approval::Exhausted => return Ok(RunOutcome::NoStory),
        };
        self.produce(&story, group, rng).map(RunOutcome::Rendered)
    }

    /// Propose stories until one is approved. Rejected stories are blacklisted.
    pub fn approve_story<R: Rng + ?Sized>(
        &self,
        group: &StoryGroup,
        host: &mut dyn StoryHost,
        rng: &mut R,
    ) -> StoryResult<Approval> {
        let filter = QualityFilter::new(self.config.selection.max_duration_secs);
        let finder = StoryFinder::new(&self.source, &self.history, filter);
        loop {
            let Some(story) = finder.find(group, rng)? else {
                tracing::warn!(group = group.name, "no suitable stories found");
                return Ok(Approval::Exhausted);
            };
            let preview = StoryPreview::new(&story, self.config.selection.max_duration_secs);
            match host.review(&story, &preview) {
                Review::Approve => {
                    tracing::info!(id = %story.id, title = %story.title, "story approved");
                    return Ok(Approval::Approved(story));
                }
                Review::Reject => {
                    let outcome = self.history.mark_blacklisted(&story.id, &story.title);
                    if outcome.is_failure() {
                        tracing::warn!(id = %story.id, ?outcome, "could not persist rejection");
                    }
                    tracing::info!(id = %story.id, "story rejected and blacklisted");
                }
                Review::Quit => return Ok(Approval::Quit),
            }
        }
    }

    /// Narrate, caption and compose an approved story.
    #[tracing::instrument(skip_all, fields(id = %story.id))]
    pub fn produce<R: Rng + ?Sized>(
        &mut self,
        story: &StoryPackage,
        group: &StoryGroup,
        rng: &mut R,
    ) -> StoryResult<ComposedVideo> {
        let ceiling = self.config.selection.max_duration_secs;
        let estimate = story_duration_seconds(&story.title, &story.body);
        if fits_ceiling(estimate, ceiling) {
            tracing::info!(estimate_secs = estimate, ceiling_secs = ceiling, "duration within limit");
        } else {
            tracing::warn!(estimate_secs = estimate, ceiling_secs = ceiling, "story exceeds duration limit");
        }

        let narration = self.narrate(&story.narration_text(), rng)?;

        let media = &self.config.media;
        if !narration.path.is_file() {
            return Err(StoryError::composition(format!(
                "narration file '{}' not found",
                narration.path.display()
            )));
        }
        if !media.background_video.is_file() {
            return Err(StoryError::composition(format!(
                "background video '{}' not found",
                media.background_video.display()
            )));
        }

        let narration_secs = match probe_duration(&narration.path) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!(error = %e, "could not measure narration");
                None
            }
        };
        let plan = plan_captions(
            &story.narration_text(),
            narration_secs,
            self.config.captions.max_caption_chars,
        );
        tracing::info!(
            captions = plan.units.len(),
            audio_timed = plan.audio_timed,
            "captions planned"
        );

        let out: PathBuf = output_path(&media.output_root, group.slug, &story.title);
        tracing::info!(out = %out.display(), "composing video");
        let req = ComposeRequest {
            source_video: &media.background_video,
            narration_audio: &narration.path,
            captions: &plan.units,
            background_audio: media.background_music.as_deref(),
        };
        self.composer.compose(&req, &out, rng)
    }

    fn narrate<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> StoryResult<NarrationOutput> {
        let voice = match self.voices.choose_next(rng) {
            Some(voice) => voice,
            None => {
                let voice = NARRATION_VOICES[0].id;
                let _ = self.voices.save_last_voice(voice);
                voice
            }
        };
        tracing::info!(voice, label = voice_label(voice), "narrating");
        self.narrator
            .narrate(text, voice, &self.config.media.narration_path)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
