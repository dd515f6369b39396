//! Article body extraction.
//!
//! Pages come from arbitrary publishers, so there is no single selector that
//! finds the story text. Strategies are tried in order and the first one that
//! yields text wins:
//!
//! | # | Strategy | Selector |
//! |---|----------|----------|
//! | 1 | Semantic container | `article` |
//! | 2 | Known container classes, in priority order | `div.article-body`, `div.article-content`, `div.story-body`, `div.content`, `div.main-content` |
//! | 3 | Long paragraphs | `p` with more than `min_paragraph_chars` characters |
//!
//! Nothing found, or a page that fails to load, yields an empty body.

use crate::config::ExtractionConfig;
use crate::error::NewsError;
use crate::models::ExtractedContent;
use crate::render::PageRenderer;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Which strategy produced the body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Article,
    ContainerClass(String),
    Paragraphs,
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn joined_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// Run the strategy chain over an HTML document.
///
/// Returns the body text and the strategy that produced it, or `None` if no
/// strategy found any text.
pub fn extract_body(html: &str, config: &ExtractionConfig) -> Option<(String, Strategy)> {
    let document = Html::parse_document(html);

    let text = joined_text(&document, &ARTICLE);
    if !text.is_empty() {
        return Some((text, Strategy::Article));
    }

    for class in &config.container_classes {
        let css = format!("div.{class}");
        let Ok(selector) = Selector::parse(&css) else {
            warn!(%class, "Skipping unparsable container class");
            continue;
        };
        let text = joined_text(&document, &selector);
        if !text.is_empty() {
            return Some((text, Strategy::ContainerClass(class.clone())));
        }
    }

    let text = document
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|t| t.chars().count() > config.min_paragraph_chars)
        .join(" ");
    if !text.is_empty() {
        return Some((text, Strategy::Paragraphs));
    }

    None
}

/// Fetches pages through a [`PageRenderer`] and extracts their body text.
#[derive(Debug)]
pub struct ContentExtractor<R> {
    renderer: R,
    config: ExtractionConfig,
}

impl<R: PageRenderer> ContentExtractor<R> {
    pub fn new(renderer: R, config: ExtractionConfig) -> Self {
        Self { renderer, config }
    }

    /// Render `url` and run the strategy chain over it.
    ///
    /// # Errors
    ///
    /// [`NewsError::ContentUnavailable`] for malformed URLs, pages that fail to
    /// load, and pages where no strategy finds text.
    pub async fn try_extract(&self, url: &str) -> Result<(String, Strategy), NewsError> {
        let unavailable = |reason: String| NewsError::ContentUnavailable {
            url: url.to_string(),
            reason,
        };
        Url::parse(url).map_err(|e| unavailable(format!("invalid url: {e}")))?;
        let html = self
            .renderer
            .render(url)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        extract_body(&html, &self.config).ok_or_else(|| {
            debug!(bytes = html.len(), "No extraction strategy matched");
            unavailable("no extraction strategy matched".to_string())
        })
    }

    /// Extract the body text of `url`. Never fails: an unreachable page or one
    /// with no recognizable content yields an empty body.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> ExtractedContent {
        match self.try_extract(url).await {
            Ok((body_text, strategy)) => {
                info!(?strategy, chars = body_text.chars().count(), "Extracted article body");
                ExtractedContent {
                    url: url.to_string(),
                    body_text,
                }
            }
            Err(e) => {
                warn!(error = %e, "Article content unavailable");
                ExtractedContent::unavailable(url)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned HTML per URL; unknown URLs fail like a DNS error would.
    pub(crate) struct FixturePages(pub HashMap<String, String>);

    impl PageRenderer for FixturePages {
        async fn render(&self, url: &str) -> Result<String, NewsError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| NewsError::ContentUnavailable {
                    url: url.to_string(),
                    reason: "no fixture".to_string(),
                })
        }
    }

    fn long(word: &str) -> String {
        vec![word; 40].join(" ")
    }

    #[test]
    fn test_article_beats_main_content() {
        let html = r#"<html><body>
            <div class="main-content">Sidebar and navigation text</div>
            <article><h1>Fed holds</h1><p>The Federal Reserve kept rates unchanged.</p></article>
        </body></html>"#;
        let (text, strategy) = extract_body(html, &ExtractionConfig::default()).unwrap();
        assert_eq!(strategy, Strategy::Article);
        assert_eq!(text, "Fed holds The Federal Reserve kept rates unchanged.");
    }

    #[test]
    fn test_multiple_articles_are_concatenated() {
        let html = "<article>First part.</article><article>Second part.</article>";
        let (text, _) = extract_body(html, &ExtractionConfig::default()).unwrap();
        assert_eq!(text, "First part. Second part.");
    }

    #[test]
    fn test_class_priority_order() {
        let html = r#"<div class="content">generic content</div>
            <div class="story-body">story one</div>
            <div class="story-body">story two</div>"#;
        let (text, strategy) = extract_body(html, &ExtractionConfig::default()).unwrap();
        assert_eq!(strategy, Strategy::ContainerClass("story-body".to_string()));
        assert_eq!(text, "story one story two");
    }

    #[test]
    fn test_empty_article_falls_through_to_class() {
        let html = r#"<article>   </article><div class="article-body">Body text here</div>"#;
        let (text, strategy) = extract_body(html, &ExtractionConfig::default()).unwrap();
        assert_eq!(strategy, Strategy::ContainerClass("article-body".to_string()));
        assert_eq!(text, "Body text here");
    }

    #[test]
    fn test_paragraph_fallback_keeps_long_paragraphs_in_order() {
        let html = format!(
            "<body><p>Short teaser.</p><p>{}</p><p>Subscribe now</p><p>{}</p></body>",
            long("alpha"),
            long("beta")
        );
        let (text, strategy) = extract_body(&html, &ExtractionConfig::default()).unwrap();
        assert_eq!(strategy, Strategy::Paragraphs);
        assert!(text.starts_with("alpha"));
        assert!(text.ends_with("beta"));
        assert!(!text.contains("Short teaser"));
        assert!(!text.contains("Subscribe"));
    }

    #[test]
    fn test_nothing_matches_yields_none() {
        let html = "<html><body><div id=\"app\"></div><p>Too short.</p></body></html>";
        assert!(extract_body(html, &ExtractionConfig::default()).is_none());
    }

    #[tokio::test]
    async fn test_extract_empty_page_is_unavailable_not_error() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/empty".to_string(),
            "<html><body><p>tiny</p></body></html>".to_string(),
        );
        let extractor = ContentExtractor::new(FixturePages(pages), ExtractionConfig::default());
        let content = extractor.extract("https://example.com/empty").await;
        assert!(content.is_empty());
        assert_eq!(content.url, "https://example.com/empty");
    }

    #[tokio::test]
    async fn test_extract_render_failure_is_unavailable() {
        let extractor =
            ContentExtractor::new(FixturePages(HashMap::new()), ExtractionConfig::default());
        let content = extractor.extract("https://example.com/missing").await;
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_try_extract_reports_content_unavailable() {
        let extractor =
            ContentExtractor::new(FixturePages(HashMap::new()), ExtractionConfig::default());
        let err = extractor.try_extract("not a url").await.unwrap_err();
        assert!(matches!(err, NewsError::ContentUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_extract_invalid_url() {
        let extractor =
            ContentExtractor::new(FixturePages(HashMap::new()), ExtractionConfig::default());
        assert!(extractor.extract("not a url").await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_article_page() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/cpi".to_string(),
            "<article>Consumer prices rose 0.3% in September.</article>".to_string(),
        );
        let extractor = ContentExtractor::new(FixturePages(pages), ExtractionConfig::default());
        let content = extractor.extract("https://example.com/cpi").await;
        assert_eq!(content.body_text, "Consumer prices rose 0.3% in September.");
    }
}
