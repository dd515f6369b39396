//! The batch pipeline: fetch → filter → rank → extract → summarize →
//! translate → sink.
//!
//! Each stage finishes before the next one starts. Topic fetches and article
//! processing run with bounded concurrency, but results are always collected in
//! input order, so the output is identical to a sequential run. Per-topic and
//! per-article failures degrade to empty or placeholder values; only the sink
//! may end a run with an error.

use crate::api::AskAsync;
use crate::config::PipelineConfig;
use crate::error::NewsError;
use crate::filter::{FilterRules, filter_items};
use crate::models::{ExtractedContent, RankedItem, SummaryRecord};
use crate::outputs::Sink;
use crate::rank::rank;
use crate::render::PageRenderer;
use crate::scrapers::article::ContentExtractor;
use crate::scrapers::google_news::{FeedSource, fetch_all};
use crate::summarize::Summarizer;
use crate::translate::{Translate, translate_or_original};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub raw_items: usize,
    pub filtered_items: usize,
    pub ranked_items: usize,
    pub processed: usize,
    /// Articles whose body could not be extracted.
    pub content_unavailable: usize,
    /// Rows whose summary is the placeholder, whatever the cause.
    pub placeholders: usize,
}

pub struct Pipeline<'c, F, R, A, T> {
    config: &'c PipelineConfig,
    feeds: F,
    extractor: ContentExtractor<R>,
    summarizer: Summarizer<A>,
    translator: Option<T>,
}

impl<'c, F, R, A, T> Pipeline<'c, F, R, A, T>
where
    F: FeedSource,
    R: PageRenderer,
    A: AskAsync,
    T: Translate,
{
    /// `translator` is only used when the config names a target language.
    pub fn new(
        config: &'c PipelineConfig,
        feeds: F,
        renderer: R,
        backend: A,
        translator: Option<T>,
    ) -> Self {
        Self {
            config,
            feeds,
            extractor: ContentExtractor::new(renderer, config.extraction.clone()),
            summarizer: Summarizer::new(backend, config.summary.clone(), config.placeholder.clone()),
            translator,
        }
    }

    /// Fetch every topic, filter against `now`, dedupe and rank.
    #[instrument(level = "info", skip(self))]
    pub async fn collect(&self, now: DateTime<Utc>) -> (Vec<RankedItem>, RunStats) {
        let raw = fetch_all(
            &self.feeds,
            &self.config.topics,
            self.config.items_per_topic,
            self.config.concurrency,
        )
        .await;
        let raw_items = raw.len();

        let filtered = filter_items(raw, now, &FilterRules::from_config(self.config));
        let filtered_items = filtered.len();

        let ranked = rank(filtered);
        info!(
            raw = raw_items,
            filtered = filtered_items,
            unique = ranked.len(),
            "Collected news items"
        );

        let stats = RunStats {
            raw_items,
            filtered_items,
            ranked_items: ranked.len(),
            ..RunStats::default()
        };
        (ranked, stats)
    }

    async fn extract(&self, url: &str) -> ExtractedContent {
        match timeout(self.config.article_timeout(), self.extractor.extract(url)).await {
            Ok(content) => content,
            Err(_) => {
                warn!(%url, timeout = ?self.config.article_timeout(), "Article extraction timed out");
                ExtractedContent::unavailable(url)
            }
        }
    }

    async fn translated(&self, text: &str) -> Option<String> {
        let (translator, target) = self.translator.as_ref().zip(self.config.target_language.as_deref())?;
        Some(translate_or_original(translator, text, target).await)
    }

    /// Turn one ranked item into a record. Never fails.
    ///
    /// # Returns
    ///
    /// The record, and whether the article body was extracted.
    #[instrument(level = "info", skip_all, fields(url = %item.link))]
    pub async fn process_item(&self, item: &RankedItem, date: &str) -> (SummaryRecord, bool) {
        let content = self.extract(&item.link).await;
        let extracted = !content.is_empty();

        let summary = if content.is_empty() {
            self.summarizer.placeholder().to_string()
        } else {
            let summary = self.summarizer.summarize(&content.body_text).await;
            if summary == self.summarizer.placeholder() {
                summary
            } else {
                self.translated(&summary).await.unwrap_or(summary)
            }
        };

        let record = SummaryRecord {
            date: date.to_string(),
            title: item.title.clone(),
            url: item.link.clone(),
            summary,
            translated_title: self.translated(&item.title).await,
        };
        (record, extracted)
    }

    /// Process the top `top_n` ranked items, preserving rank order.
    #[instrument(level = "info", skip_all, fields(items = ranked.len(), top_n = self.config.top_n))]
    pub async fn process(&self, ranked: &[RankedItem], date: &str) -> Vec<(SummaryRecord, bool)> {
        stream::iter(ranked.iter().take(self.config.top_n))
            .map(|item| self.process_item(item, date))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Run the whole pipeline and hand the records to `sink`.
    ///
    /// # Errors
    ///
    /// Only sink failures are returned.
    pub async fn run<S: Sink>(
        &self,
        sink: &mut S,
        now: DateTime<Utc>,
        date: &str,
    ) -> Result<RunStats, NewsError> {
        let (ranked, mut stats) = self.collect(now).await;
        info!(count = ranked.len(), "Found news items");

        let processed = self.process(&ranked, date).await;
        stats.processed = processed.len();
        stats.content_unavailable = processed.iter().filter(|(_, extracted)| !extracted).count();
        stats.placeholders = processed
            .iter()
            .filter(|(record, _)| record.summary == self.config.placeholder)
            .count();
        info!(
            processed = stats.processed,
            unavailable = stats.content_unavailable,
            placeholders = stats.placeholders,
            "Summaries ready"
        );

        sink.append(processed.iter().map(|(record, _)| record.to_row()).collect())
            .await?;
        info!("Worksheet update complete");
        Ok(stats)
    }
}
