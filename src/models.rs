//! Data models flowing through the pipeline.
//!
//! - [`FeedItem`]: an entry as parsed from a topic feed
//! - [`FilteredItem`]: a feed entry that passed the recency and media filters
//! - [`ExtractedContent`]: the body text recovered from an article page
//! - [`SummaryRecord`]: one output row per ranked article

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw entry from a topic feed.
///
/// Missing text fields are empty strings. `published_at` is `None` when the
/// feed omitted `pubDate` or it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Headline, usually suffixed with ` - Publisher` by Google News.
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A feed entry that survived [`crate::filter::filter_items`].
///
/// Unlike [`FeedItem`] the publish time is always known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

/// A filtered item after deduplication and recency sorting.
pub type RankedItem = FilteredItem;

/// Body text recovered from an article page. Empty text means no strategy
/// found anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub url: String,
    pub body_text: String,
}

impl ExtractedContent {
    /// Empty result for a page that could not be read.
    pub fn unavailable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            body_text: String::new(),
        }
    }

    /// `true` when no body text was recovered.
    pub fn is_empty(&self) -> bool {
        self.body_text.trim().is_empty()
    }
}

/// The final output unit, one per processed article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Local run date in `YYYY-MM-DD` format.
    pub date: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub translated_title: Option<String>,
}

impl SummaryRecord {
    /// Cells in worksheet column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.title.clone(),
            self.url.clone(),
            self.summary.clone(),
            self.translated_title.clone().unwrap_or_default(),
        ]
    }
}
