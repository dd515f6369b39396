//! Google News RSS topic search.
//!
//! Each topic becomes one query against the Google News RSS search endpoint,
//! e.g. `https://news.google.com/rss/search?q=US%20retail%20sales&hl=en-US&gl=US&ceid=US:en`.
//! Only the first few items of each feed are kept, in feed order.
//!
//! A topic whose feed cannot be fetched or parsed contributes nothing; the
//! failure is logged and the remaining topics proceed.

use crate::error::NewsError;
use crate::http::{RetryPolicy, get_text};
use crate::models::FeedItem;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Anything that can return the raw feed document for a topic.
pub trait FeedSource {
    async fn fetch_feed(&self, topic: &str) -> Result<String, NewsError>;
}

/// Live Google News RSS search.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: Client,
    url_template: String,
    policy: RetryPolicy,
}

impl GoogleNews {
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `url_template` - Feed URL containing a `{query}` placeholder
    /// * `policy` - Retry policy for feed requests
    pub fn new(client: Client, url_template: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            policy,
        }
    }

    /// Feed URL for `topic` under this client's URL template.
    pub fn search_url(&self, topic: &str) -> String {
        search_url(&self.url_template, topic)
    }
}

impl FeedSource for GoogleNews {
    #[instrument(level = "info", skip(self))]
    async fn fetch_feed(&self, topic: &str) -> Result<String, NewsError> {
        let url = self.search_url(topic);
        debug!(%url, "Fetching topic feed");
        get_text(&self.client, &url, &self.policy)
            .await
            .map_err(|e| NewsError::SourceUnavailable {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Substitute the URL-encoded topic into `{query}`.
pub fn search_url(template: &str, topic: &str) -> String {
    template.replace("{query}", &urlencoding::encode(topic))
}

/// Parse an RFC 822 `pubDate`, e.g. `Fri, 16 Oct 2026 14:05:00 GMT`.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Google wraps descriptions in HTML (`<a>` headline plus `<font>` source).
fn clean_description(raw: &str) -> String {
    let without_tags = HTML_TAG.replace_all(raw, " ");
    collapse_whitespace(&without_tags.replace("&nbsp;", " "))
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Parse an RSS 2.0 document into at most `cap` items, in feed order.
pub fn parse_feed(xml: &str, cap: usize) -> Result<Vec<FeedItem>, NewsError> {
    let rss: Rss = from_str(&scrub_html_entities_for_xml(xml))
        .map_err(|e| NewsError::Parse(format!("rss document: {e}")))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .take(cap)
        .map(|it| FeedItem {
            title: it.title.map(|t| collapse_whitespace(&t)).unwrap_or_default(),
            link: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
            description: it
                .description
                .as_deref()
                .map(clean_description)
                .unwrap_or_default(),
            published_at: it.pub_date.as_deref().and_then(parse_pub_date),
        })
        .collect())
}

/// Fetch and parse one topic. Failures are logged and yield no items.
#[instrument(level = "info", skip(source))]
pub async fn fetch_topic<S: FeedSource>(source: &S, topic: &str, cap: usize) -> Vec<FeedItem> {
    let parsed = match source.fetch_feed(topic).await {
        Ok(xml) => parse_feed(&xml, cap),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(items) => {
            info!(count = items.len(), "Parsed topic feed");
            items
        }
        Err(e) => {
            error!(error = %e, "Topic feed unavailable; skipping");
            Vec::new()
        }
    }
}

/// Fetch every topic with at most `concurrency` requests in flight.
///
/// Results are concatenated in topic order, exactly as a sequential loop over
/// `topics` would produce them.
#[instrument(level = "info", skip_all, fields(topics = topics.len(), concurrency = concurrency))]
pub async fn fetch_all<S: FeedSource>(
    source: &S,
    topics: &[String],
    cap: usize,
    concurrency: usize,
) -> Vec<FeedItem> {
    let per_topic: Vec<Vec<FeedItem>> = stream::iter(topics.iter())
        .map(|topic| fetch_topic(source, topic, cap))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let items: Vec<FeedItem> = per_topic.into_iter().flatten().collect();
    info!(count = items.len(), "Fetched raw feed items");
    items
}
