//! storyreel turns community stories into captioned, narrated 9:16 videos.
//!
//! A run picks a fresh, duration-bounded story, asks a [`StoryHost`] to approve it, narrates it,
//! times captions against the measured narration and composes the final MP4 through `ffmpeg`.
#![forbid(unsafe_code)]

pub mod audio;
pub mod captions;
pub mod compose;
pub mod encode;
pub mod foundation;
pub mod history;
pub mod media;
pub mod naming;
pub mod narration;
pub mod pipeline;
pub mod selection;
pub mod source;

pub use crate::foundation::clock::{Clock, ManualClock, SystemClock};
pub use crate::foundation::config::StoryConfig;
pub use crate::foundation::core::{Fps, FrameIndex};
pub use crate::foundation::error::{StoryError, StoryResult};

pub use crate::captions::render::{CaptionImage, CaptionRenderer};
pub use crate::captions::timing::CaptionUnit;
pub use crate::compose::composer::{
    ComposeRequest, ComposeSettings, ComposedVideo, CompositionReport, VideoComposer,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameRGBA, FrameSink, InMemorySink, SinkConfig};
pub use crate::history::store::{HistoryStore, PersistOutcome};
pub use crate::history::voice::VoiceStore;
pub use crate::narration::{NarrationBackend, Narrator};
pub use crate::pipeline::{Approval, Pipeline, Review, RunOutcome, StoryHost, StoryPreview};
pub use crate::selection::model::{CandidateItem, StoryPackage};
pub use crate::source::{ContentSource, STORY_GROUPS, StoryGroup};
