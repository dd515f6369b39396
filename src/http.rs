//! Shared HTTP client construction and single-retry GET.
//!
//! Every outbound page or feed request goes through [`get_text`], which applies
//! a per-request timeout and retries a failed attempt once (by default) after a
//! short jittered delay.

use crate::config::PipelineConfig;
use crate::error::NewsError;
use rand::{Rng, rng};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Retry and timeout settings shared by every outbound request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: usize,
    /// Delay before the first retry; doubles per attempt, plus jitter.
    pub base_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Policy from the pipeline's `retries` and `request_timeout_secs`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            retries: config.retries,
            base_delay: Duration::from_millis(500),
            timeout: config.request_timeout(),
        }
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let backoff = self.base_delay.saturating_mul(1 << (attempt.saturating_sub(1)).min(5));
        let jitter_ms: u64 = rng().random_range(0..=250);
        backoff + Duration::from_millis(jitter_ms)
    }
}

/// Build the client used for feed and page requests: fixed user agent, no
/// cookie store.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, NewsError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?)
}

async fn get_once(client: &Client, url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
    client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// GET `url` as text, retrying according to `policy`.
#[instrument(level = "debug", skip(client, policy))]
pub async fn get_text(client: &Client, url: &str, policy: &RetryPolicy) -> Result<String, NewsError> {
    let t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        match get_once(client, url, policy.timeout).await {
            Ok(body) => {
                debug!(
                    bytes = body.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "GET succeeded"
                );
                return Ok(body);
            }
            Err(e) => {
                attempt += 1;
                if attempt > policy.retries {
                    return Err(NewsError::Http(e));
                }
                let delay = policy.delay_for(attempt);
                warn!(attempt, max = policy.retries, ?delay, error = %e, "GET failed; retrying");
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let config = PipelineConfig::default();
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.retries, 1);
        assert_eq!(policy.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_delay_includes_bounded_jitter() {
        let policy = RetryPolicy {
            retries: 1,
            base_delay: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        };
        let d = policy.delay_for(1);
        assert!(d >= Duration::from_millis(100));
        assert!(d <= Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retry() {
        let client = build_client("test-agent", Duration::from_secs(2)).unwrap();
        let policy = RetryPolicy {
            retries: 1,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
        };
        let res = get_text(&client, "http://127.0.0.1:9/feed", &policy).await;
        assert!(matches!(res, Err(NewsError::Http(_))));
    }
}
