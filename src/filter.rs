//! Recency and media-type filtering of raw feed items.
//!
//! An item survives only if all three predicates pass:
//! it is younger than the configured age window, its link does not point at a
//! document or video host, and its title carries no video/podcast marker.
//! Items without a publish time are dropped; ranking needs a timestamp.

use crate::models::{FeedItem, FilteredItem};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Filter settings borrowed from the pipeline configuration.
#[derive(Debug, Clone)]
pub struct FilterRules<'a> {
    pub max_age: Duration,
    pub excluded_link_markers: &'a [String],
    pub excluded_title_markers: &'a [String],
}

impl<'a> FilterRules<'a> {
    pub fn from_config(config: &'a crate::config::PipelineConfig) -> Self {
        Self {
            max_age: config.max_age(),
            excluded_link_markers: &config.excluded_link_markers,
            excluded_title_markers: &config.excluded_title_markers,
        }
    }
}

fn contains_any(haystack: &str, markers: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    markers
        .iter()
        .any(|m| haystack.contains(&m.to_lowercase()))
}

fn is_recent(published_at: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    now - published_at < max_age
}

/// Apply the recency window and exclusion markers to `items`, keeping order.
pub fn filter_items(
    items: Vec<FeedItem>,
    now: DateTime<Utc>,
    rules: &FilterRules<'_>,
) -> Vec<FilteredItem> {
    items
        .into_iter()
        .filter_map(|item| {
            let Some(published_at) = item.published_at else {
                debug!(link = %item.link, "Dropping item without a parseable pubDate");
                return None;
            };
            if !is_recent(published_at, now, rules.max_age) {
                debug!(link = %item.link, %published_at, "Dropping stale item");
                return None;
            }
            if contains_any(&item.link, rules.excluded_link_markers) {
                debug!(link = %item.link, "Dropping non-article link");
                return None;
            }
            if contains_any(&item.title, rules.excluded_title_markers) {
                debug!(title = %item.title, "Dropping media item");
                return None;
            }
            Some(FilteredItem {
                title: item.title,
                link: item.link,
                description: item.description,
                published_at,
            })
        })
        .collect()
}
