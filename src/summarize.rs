//! Chunked abstractive summarization.
//!
//! The body text is cut into fixed-size character chunks. Only the first few
//! chunks are summarized (the lede of a news story carries most of the
//! information), and chunks too short to summarize are skipped. The per-chunk
//! summaries are joined with a space.

use crate::api::AskAsync;
use crate::config::SummaryConfig;
use crate::utils::{char_chunks, collapse_whitespace, truncate_for_log};
use tracing::{debug, info, instrument, warn};

/// Build the prompt sent to the model for one chunk.
pub fn chunk_prompt(chunk: &str, min_words: usize, max_words: usize) -> String {
    format!(
        "Summarize the following news excerpt in {min_words} to {max_words} words. \
         Reply with the summary only.\n\n{chunk}"
    )
}

/// Summarizes article bodies through an [`AskAsync`] backend.
#[derive(Debug)]
pub struct Summarizer<A> {
    backend: A,
    config: SummaryConfig,
    placeholder: String,
}

impl<A: AskAsync> Summarizer<A> {
    pub fn new(backend: A, config: SummaryConfig, placeholder: impl Into<String>) -> Self {
        Self {
            backend,
            config,
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The chunks that will be sent to the model for `body`.
    pub fn chunks<'b>(&self, body: &'b str) -> Vec<&'b str> {
        char_chunks(body, self.config.chunk_chars)
            .into_iter()
            .take(self.config.max_chunks)
            .filter(|c| c.chars().count() > self.config.min_chunk_chars)
            .collect()
    }

    /// Summarize `body`. Empty input, or input for which no chunk could be
    /// summarized, yields the placeholder.
    #[instrument(level = "info", skip_all, fields(chars = body.chars().count()))]
    pub async fn summarize(&self, body: &str) -> String {
        if body.trim().is_empty() {
            return self.placeholder.clone();
        }

        let mut parts = Vec::new();
        for (i, chunk) in self.chunks(body).into_iter().enumerate() {
            let prompt = chunk_prompt(chunk, self.config.min_words, self.config.max_words);
            match self.backend.ask(&prompt).await {
                Ok(summary) => {
                    let summary = collapse_whitespace(&summary);
                    debug!(chunk = i, preview = %truncate_for_log(&summary, 80), "Chunk summarized");
                    if !summary.is_empty() {
                        parts.push(summary);
                    }
                }
                Err(e) => warn!(chunk = i, error = %e, "Chunk summarization failed; skipping"),
            }
        }

        if parts.is_empty() {
            warn!("No chunk produced a summary");
            return self.placeholder.clone();
        }
        info!(chunks = parts.len(), "Summary built");
        parts.join(" ")
    }
}
