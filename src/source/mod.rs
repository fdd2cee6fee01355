//! Content sources and the fixed story-group presets.

/// Reddit public JSON listing adapter.
pub mod reddit;

use crate::foundation::error::StoryResult;
use crate::selection::model::CandidateItem;

/// Listing order requested from a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortMode {
    Top,
    Hot,
    New,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Hot => "hot",
            Self::New => "new",
        }
    }
}

/// Time window for [`SortMode::Top`] listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    All,
    Year,
    Month,
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
        }
    }
}

/// One listing query in the multi-strategy sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchStrategy {
    pub sort: SortMode,
    pub window: Option<TimeWindow>,
    pub limit: usize,
    pub label: &'static str,
}

/// Quality-first sweep: long-window top listings first, recent posts last for variety.
pub const FETCH_STRATEGIES: [FetchStrategy; 6] = [
    FetchStrategy {
        sort: SortMode::Top,
        window: Some(TimeWindow::All),
        limit: 500,
        label: "all-time top posts",
    },
    FetchStrategy {
        sort: SortMode::Top,
        window: Some(TimeWindow::Year),
        limit: 400,
        label: "this year's top posts",
    },
    FetchStrategy {
        sort: SortMode::Top,
        window: Some(TimeWindow::Month),
        limit: 300,
        label: "this month's top posts",
    },
    FetchStrategy {
        sort: SortMode::Hot,
        window: None,
        limit: 200,
        label: "currently hot posts",
    },
    FetchStrategy {
        sort: SortMode::Top,
        window: Some(TimeWindow::Week),
        limit: 200,
        label: "this week's top posts",
    },
    FetchStrategy {
        sort: SortMode::New,
        window: None,
        limit: 100,
        label: "recent posts",
    },
];

/// A named preset of communities tried in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoryGroup {
    pub name: &'static str,
    /// Folder name under the output root.
    pub slug: &'static str,
    pub subreddits: &'static [&'static str],
    pub blurb: &'static str,
}

pub const STORY_GROUPS: [StoryGroup; 3] = [
    StoryGroup {
        name: "Personal Stories",
        slug: "personal_stories",
        subreddits: &["TrueOffMyChest", "Confessions"],
        blurb: "real-life confessions and personal experiences",
    },
    StoryGroup {
        name: "AITA Stories",
        slug: "aita_stories",
        subreddits: &["AmItheAsshole", "AITA"],
        blurb: "moral dilemmas and relationship drama",
    },
    StoryGroup {
        name: "Spooky Stories",
        slug: "spooky_stories",
        subreddits: &["nosleep", "scarystories"],
        blurb: "horror stories and creepy experiences",
    },
];

/// Read-only provider of candidate stories.
pub trait ContentSource {
    /// Fetch up to `limit` items from `group` (a community name) in the given order.
    fn fetch(
        &self,
        group: &str,
        sort: SortMode,
        window: Option<TimeWindow>,
        limit: usize,
    ) -> StoryResult<Vec<CandidateItem>>;
}

impl<S: ContentSource + ?Sized> ContentSource for &S {
    fn fetch(
        &self,
        group: &str,
        sort: SortMode,
        window: Option<TimeWindow>,
        limit: usize,
    ) -> StoryResult<Vec<CandidateItem>> {
        (**self).fetch(group, sort, window, limit)
    }
}
