//! Page rendering for article extraction.
//!
//! [`HttpRenderer`] fetches article pages with a fixed desktop user agent.
//! Each render runs inside a [`RenderSession`] guard that is released when it
//! goes out of scope, on success and on every error path alike.
//!
//! Pages that load their body late are handled by polling: the renderer
//! re-fetches until one of the extraction strategies finds text, and stops
//! after `max_polls` fetches or when the ready timeout runs out. It then
//! hands back the last document it saw.

use crate::config::ExtractionConfig;
use crate::error::NewsError;
use crate::http::{RetryPolicy, get_text};
use crate::scrapers::article::extract_body;
use reqwest::Client;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Anything that can turn a URL into an HTML document.
pub trait PageRenderer {
    async fn render(&self, url: &str) -> Result<String, NewsError>;
}

/// Scoped render session. Dropping it releases the slot.
#[derive(Debug)]
pub struct RenderSession {
    active: Arc<AtomicUsize>,
    url: String,
    opened: Instant,
}

impl RenderSession {
    fn open(active: &Arc<AtomicUsize>, url: &str) -> Self {
        let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%url, active = now_active, "Render session opened");
        Self {
            active: Arc::clone(active),
            url: url.to_string(),
            opened: Instant::now(),
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(
            url = %self.url,
            held_ms = self.opened.elapsed().as_millis() as u64,
            active = remaining,
            "Render session released"
        );
    }
}

/// Renders pages with plain HTTP GETs plus bounded readiness polling.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
    policy: RetryPolicy,
    config: ExtractionConfig,
    active: Arc<AtomicUsize>,
}

/// A document is ready once some extraction strategy finds text in it.
fn is_ready(html: &str, config: &ExtractionConfig) -> bool {
    extract_body(html, config).is_some()
}

impl HttpRenderer {
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client (user agent and timeouts already set)
    /// * `policy` - Retry policy applied to every fetch
    /// * `config` - Extraction settings; readiness uses the same strategy chain
    pub fn new(client: Client, policy: RetryPolicy, config: &ExtractionConfig) -> Self {
        Self {
            client,
            policy,
            config: config.clone(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.config.ready_timeout_secs)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.ready_poll_millis.max(1))
    }

    /// Sessions currently open.
    #[cfg(test)]
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl PageRenderer for HttpRenderer {
    #[instrument(level = "debug", skip(self))]
    async fn render(&self, url: &str) -> Result<String, NewsError> {
        let _session = RenderSession::open(&self.active, url);
        let deadline = Instant::now() + self.ready_timeout();
        let max_polls = self.config.max_polls.max(1);
        let mut polls = 0usize;

        loop {
            let html = get_text(&self.client, url, &self.policy).await?;
            polls += 1;
            if is_ready(&html, &self.config) {
                debug!(polls, "Page ready");
                return Ok(html);
            }
            if polls >= max_polls {
                debug!(polls, "Poll limit reached; using last document");
                return Ok(html);
            }
            if Instant::now() + self.poll_interval() >= deadline {
                debug!(polls, "Ready timeout reached; using last document");
                return Ok(html);
            }
            sleep(self.poll_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SHELL: &str =
        "<html><body><div id=\"root\"></div><noscript><p>Enable JS</p></noscript></body></html>";
    const READY: &str = "<html><body><article>Payrolls rose by 150,000.</article></body></html>";

    fn policy() -> RetryPolicy {
        RetryPolicy {
            retries: 0,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
        }
    }

    fn polling_config(max_polls: usize, ready_timeout_secs: u64) -> ExtractionConfig {
        ExtractionConfig {
            max_polls,
            ready_timeout_secs,
            ready_poll_millis: 10,
            ..ExtractionConfig::default()
        }
    }

    fn local_renderer(config: &ExtractionConfig) -> HttpRenderer {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpRenderer::new(client, policy(), config)
    }

    /// Serve `pages` in order, one per connection, repeating the last one.
    /// Returns the page URL and a hit counter.
    async fn serve(pages: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let body = pages[n.min(pages.len() - 1)];

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let read = socket.read(&mut buf).await.unwrap_or(0);
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..read]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/article"), hits)
    }

    #[test]
    fn test_readiness_follows_extraction_chain() {
        let config = ExtractionConfig::default();
        assert!(is_ready(READY, &config));
        assert!(is_ready("<div class=\"story-body\">x</div>", &config));
        assert!(!is_ready(SHELL, &config));
        assert!(!is_ready("<p>short</p>", &config));
    }

    #[test]
    fn test_session_released_on_drop() {
        let active = Arc::new(AtomicUsize::new(0));
        {
            let _a = RenderSession::open(&active, "https://example.com/a");
            let _b = RenderSession::open(&active, "https://example.com/b");
            assert_eq!(active.load(Ordering::SeqCst), 2);
        }
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_released_after_network_failure() {
        let client = build_client("test-agent", Duration::from_secs(2)).unwrap();
        let renderer = HttpRenderer::new(client, policy(), &ExtractionConfig::default());
        let res = renderer.render("http://127.0.0.1:9/article").await;
        assert!(res.is_err());
        assert_eq!(renderer.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_ready_on_later_poll() {
        let (url, hits) = serve(vec![SHELL, READY]).await;
        let renderer = local_renderer(&polling_config(3, 5));

        let html = renderer.render(&url).await.unwrap();

        assert!(html.contains("Payrolls rose"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(renderer.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_poll_limit_returns_last_document() {
        let (url, hits) = serve(vec![SHELL]).await;
        let renderer = local_renderer(&polling_config(3, 5));

        let html = renderer.render(&url).await.unwrap();

        assert!(html.contains("Enable JS"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_ready_timeout_returns_last_document() {
        let (url, hits) = serve(vec![SHELL, READY]).await;
        let renderer = local_renderer(&polling_config(10, 0));

        let html = renderer.render(&url).await.unwrap();

        assert!(html.contains("Enable JS"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
