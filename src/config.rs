//! Pipeline configuration.
//!
//! Every knob has a default, so the binary runs with no configuration file at
//! all. A YAML file passed with `--config` overrides any subset of fields:
//!
//! ```yaml
//! topics:
//!   - "US inflation rate"
//!   - "Federal Reserve decision"
//! items_per_topic: 5
//! target_language: ja
//! ```

use crate::error::NewsError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Topic queries tracked by default.
pub const DEFAULT_TOPICS: &[&str] = &[
    "US GDP growth",
    "US economic indicators",
    "US manufacturing data",
    "US retail sales",
    "US inflation rate",
    "US employment report",
    "Federal Reserve decision",
    "US Treasury yields",
    "US stock market outlook",
    "Wall Street analysis",
    "US corporate earnings",
    "US tech sector news",
    "US business investment",
    "US trade balance",
    "US dollar forex",
    "US economic policy",
];

/// Desktop user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Settings for one pipeline run.
///
/// Missing YAML fields fall back to [`PipelineConfig::default`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Search queries, one feed request each, processed in this order.
    pub topics: Vec<String>,
    /// Feed URL with a `{query}` placeholder for the URL-encoded topic.
    pub feed_url_template: String,
    /// Items kept from the head of each topic feed.
    pub items_per_topic: usize,
    /// Items must be strictly younger than this many hours.
    pub max_age_hours: i64,
    /// Case-insensitive substrings that reject an item by its link.
    pub excluded_link_markers: Vec<String>,
    /// Case-insensitive substrings that reject an item by its title.
    pub excluded_title_markers: Vec<String>,
    /// Maximum number of ranked items extracted and summarized.
    pub top_n: usize,
    pub extraction: ExtractionConfig,
    pub summary: SummaryConfig,
    /// Language code for translation; `None` disables translation.
    pub target_language: Option<String>,
    /// Text recorded when no article body or summary could be produced.
    pub placeholder: String,
    /// `User-Agent` header for feed, page and translation requests.
    pub user_agent: String,
    /// Topic fetches or articles in flight at once.
    pub concurrency: usize,
    /// Timeout for a single HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound for rendering and extracting one article.
    pub article_timeout_secs: u64,
    /// Retries after a failed HTTP request or LLM call.
    pub retries: usize,
}

/// How article pages are rendered and mined for body text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Container classes tried in priority order after `<article>`.
    pub container_classes: Vec<String>,
    /// Paragraphs must be longer than this to count in the fallback strategy.
    pub min_paragraph_chars: usize,
    /// Longest time spent waiting for a page to become extractable.
    pub ready_timeout_secs: u64,
    /// Pause between readiness polls.
    pub ready_poll_millis: u64,
    /// Most fetches of one page while waiting for it to become extractable.
    pub max_polls: usize,
}

/// Chunking and prompt settings for article summaries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Characters per chunk sent to the model.
    pub chunk_chars: usize,
    /// Chunks summarized per article; the rest of the body is ignored.
    pub max_chunks: usize,
    /// Chunks shorter than this are skipped.
    pub min_chunk_chars: usize,
    /// Lower word bound requested in the prompt.
    pub min_words: usize,
    /// Upper word bound requested in the prompt.
    pub max_words: usize,
    /// awful_aj chat template used for chunk summaries.
    pub template: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            feed_url_template:
                "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en"
                    .to_string(),
            items_per_topic: 7,
            max_age_hours: 48,
            excluded_link_markers: vec![
                ".pdf".to_string(),
                "youtube.com".to_string(),
                "youtu.be".to_string(),
            ],
            excluded_title_markers: vec![
                "video:".to_string(),
                "podcast:".to_string(),
                "watch:".to_string(),
            ],
            top_n: 25,
            extraction: ExtractionConfig::default(),
            summary: SummaryConfig::default(),
            target_language: Some("ko".to_string()),
            placeholder: "Article content could not be retrieved.".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 4,
            request_timeout_secs: 20,
            article_timeout_secs: 60,
            retries: 1,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            container_classes: ["article-body", "article-content", "story-body", "content", "main-content"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_paragraph_chars: 100,
            ready_timeout_secs: 10,
            ready_poll_millis: 750,
            max_polls: 3,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 500,
            max_chunks: 3,
            min_chunk_chars: 100,
            min_words: 50,
            max_words: 150,
            template: "market_summary".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Recency window as a `chrono` duration.
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_age_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    /// Parse a YAML document, filling unspecified fields with defaults.
    pub fn from_yaml(s: &str) -> Result<Self, NewsError> {
        let config: PipelineConfig =
            serde_yaml::from_str(s).map_err(|e| NewsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// [`NewsError::Config`] if the file cannot be read, parsed or validated.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, NewsError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NewsError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&raw)?;
        info!(topics = config.topics.len(), "Loaded pipeline configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), NewsError> {
        if !self.feed_url_template.contains("{query}") {
            return Err(NewsError::Config(
                "feed_url_template must contain {query}".to_string(),
            ));
        }
        for class in &self.extraction.container_classes {
            Selector::parse(&format!("div.{class}")).map_err(|e| {
                NewsError::Config(format!("extraction.container_classes: {class:?}: {e}"))
            })?;
        }
        if self.summary.chunk_chars == 0 {
            return Err(NewsError::Config("summary.chunk_chars must be > 0".to_string()));
        }
        if self.summary.min_words > self.summary.max_words {
            return Err(NewsError::Config(
                "summary.min_words exceeds summary.max_words".to_string(),
            ));
        }
        Ok(())
    }
}
