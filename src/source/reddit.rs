use std::time::Duration;

use reqwest::header::USER_AGENT;

use crate::foundation::config::SourceConfig;
use crate::foundation::error::{StoryError, StoryResult};
use crate::selection::model::CandidateItem;
use crate::source::{ContentSource, SortMode, TimeWindow};

/// Reddit caps listing pages at 100 items.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, serde::Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, serde::Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, serde::Deserialize)]
struct RedditPost {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    stickied: bool,
}

impl RedditPost {
    fn into_candidate(self, group: &str) -> CandidateItem {
        CandidateItem {
            id: self.id,
            title: self.title,
            body: self.selftext,
            score: self.score,
            comment_count: self.num_comments,
            permalink: self.permalink,
            source_group: group.to_string(),
            stickied: self.stickied,
        }
    }
}

/// Paginating client for `https://www.reddit.com/r/<group>/<sort>.json`.
pub struct RedditSource {
    client: reqwest::blocking::Client,
    base_url: String,
    user_agent: String,
}

impl RedditSource {
    pub fn new(cfg: &SourceConfig) -> StoryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| StoryError::config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            user_agent: cfg.user_agent.clone(),
        })
    }

    fn page_url(
        &self,
        group: &str,
        sort: SortMode,
        window: Option<TimeWindow>,
        page_size: usize,
        after: Option<&str>,
    ) -> String {
        let mut url = format!(
            "{}/r/{}/{}.json?limit={page_size}&raw_json=1",
            self.base_url,
            group,
            sort.as_str()
        );
        if let (SortMode::Top, Some(w)) = (sort, window) {
            url.push_str("&t=");
            url.push_str(w.as_str());
        }
        if let Some(after) = after {
            url.push_str("&after=");
            url.push_str(after);
        }
        url
    }

    fn fetch_page(&self, url: &str) -> StoryResult<RedditListingData> {
        let listing: RedditListing = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| StoryError::source_unavailable(format!("GET {url}: {e}")))?;
        Ok(listing.data)
    }
}

impl ContentSource for RedditSource {
    #[tracing::instrument(level = "debug", skip(self))]
    fn fetch(
        &self,
        group: &str,
        sort: SortMode,
        window: Option<TimeWindow>,
        limit: usize,
    ) -> StoryResult<Vec<CandidateItem>> {
        let mut out = Vec::with_capacity(limit.min(1000));
        let mut after: Option<String> = None;
        while out.len() < limit {
            let page_size = (limit - out.len()).min(MAX_PAGE_SIZE);
            let url = self.page_url(group, sort, window, page_size, after.as_deref());
            let page = self.fetch_page(&url)?;
            if page.children.is_empty() {
                break;
            }
            out.extend(
                page.children
                    .into_iter()
                    .map(|c| c.data.into_candidate(group)),
            );
            after = page.after;
            if after.is_none() {
                break;
            }
        }
        out.truncate(limit);
        tracing::debug!(count = out.len(), "fetched listing");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/reddit.rs"]
mod tests;
