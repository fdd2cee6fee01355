use crate::selection::duration::story_duration_seconds;

/// One story as returned by a content source. Never mutated after fetch.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub comment_count: u64,
    pub permalink: String,
    pub source_group: String,
    #[serde(default)]
    pub stickied: bool,
}

/// An approved-for-review story, carried through narration and composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoryPackage {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub comment_count: u64,
    pub url: String,
    pub source_group: String,
    pub estimated_duration_seconds: f64,
}

impl StoryPackage {
    pub fn from_candidate(item: CandidateItem) -> Self {
        let estimated_duration_seconds = story_duration_seconds(&item.title, &item.body);
        Self {
            url: format!("https://reddit.com{}", item.permalink),
            id: item.id,
            title: item.title,
            body: item.body,
            score: item.score,
            comment_count: item.comment_count,
            source_group: item.source_group,
            estimated_duration_seconds,
        }
    }

    /// Text handed to the narrator: title, then body.
    pub fn narration_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// First `max_chars` characters of the body, with `...` when cut.
    pub fn body_preview(&self, max_chars: usize) -> String {
        match self.body.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.body[..cut]),
            None => self.body.clone(),
        }
    }
}

impl From<CandidateItem> for StoryPackage {
    fn from(item: CandidateItem) -> Self {
        Self::from_candidate(item)
    }
}
