//! Error taxonomy for the news pipeline.
//!
//! Per-topic and per-article failures are represented here so that each stage
//! can hand back a typed outcome. Only [`NewsError::SinkUnavailable`] and
//! [`NewsError::Config`] are allowed to end a run; everything else is absorbed
//! by the stage that produced it and turned into a degraded value.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    /// The feed for a topic could not be fetched.
    #[error("feed for topic '{topic}' unavailable: {reason}")]
    SourceUnavailable { topic: String, reason: String },

    /// No article body could be extracted for a URL.
    #[error("content unavailable for {url}: {reason}")]
    ContentUnavailable { url: String, reason: String },

    /// The translation backend failed; callers keep the source text.
    #[error("translation unavailable: {0}")]
    TranslationUnavailable(String),

    /// A feed document was not well-formed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The output destination could not be opened or written.
    #[error("sink unavailable at {path}: {reason}")]
    SinkUnavailable { path: String, reason: String },

    /// The pipeline configuration file could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl NewsError {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NewsError::SinkUnavailable { .. } | NewsError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_sink_and_config_are_fatal() {
        let sink = NewsError::SinkUnavailable {
            path: "/nope".to_string(),
            reason: "read-only".to_string(),
        };
        assert!(sink.is_fatal());
        assert!(NewsError::Config("bad yaml".to_string()).is_fatal());

        let source = NewsError::SourceUnavailable {
            topic: "US retail sales".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(!source.is_fatal());
        assert!(!NewsError::TranslationUnavailable("429".to_string()).is_fatal());
        assert!(!NewsError::Parse("eof".to_string()).is_fatal());
    }

    #[test]
    fn test_display_mentions_topic() {
        let e = NewsError::SourceUnavailable {
            topic: "US trade balance".to_string(),
            reason: "HTTP 503".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("US trade balance"));
        assert!(msg.contains("HTTP 503"));
    }
}
