//! Translation of titles and summaries.
//!
//! Translation is best effort: if the backend fails the source text is kept,
//! so a translation outage never costs an article.

use crate::error::NewsError;
use crate::http::RetryPolicy;
use reqwest::Client;
use serde_json::Value;
use tracing::{instrument, warn};

const GTX_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Anything that can translate text into a target language.
pub trait Translate {
    async fn translate(&self, text: &str, target: &str) -> Result<String, NewsError>;
}

/// Google Translate's public `gtx` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    client: Client,
    policy: RetryPolicy,
}

impl GoogleTranslate {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    async fn request(&self, text: &str, target: &str) -> Result<String, reqwest::Error> {
        self.client
            .post(GTX_ENDPOINT)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target), ("dt", "t")])
            .form(&[("q", text)])
            .timeout(self.policy.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Concatenate the translated segments of a `gtx` response:
/// `[[["translated", "source", ...], ...], null, "en", ...]`.
pub fn parse_gtx_response(body: &str) -> Result<String, NewsError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| NewsError::TranslationUnavailable(format!("bad response: {e}")))?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| NewsError::TranslationUnavailable("no segments".to_string()))?;
    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    if out.trim().is_empty() {
        return Err(NewsError::TranslationUnavailable("empty translation".to_string()));
    }
    Ok(out)
}

impl Translate for GoogleTranslate {
    #[instrument(level = "debug", skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str, target: &str) -> Result<String, NewsError> {
        let mut attempt = 0usize;
        let body = loop {
            match self.request(text, target).await {
                Ok(body) => break body,
                Err(e) if attempt < self.policy.retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Translation request failed; retrying");
                    tokio::time::sleep(self.policy.base_delay).await;
                }
                Err(e) => return Err(NewsError::TranslationUnavailable(e.to_string())),
            }
        };
        parse_gtx_response(&body)
    }
}

/// Translate `text`, falling back to the original on any failure.
pub async fn translate_or_original<T: Translate>(translator: &T, text: &str, target: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    match translator.translate(text, target).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(error = %e, %target, "Keeping untranslated text");
            text.to_string()
        }
    }
}
