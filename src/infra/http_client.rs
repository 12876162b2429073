use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::app::ports::FetcherPort;
use crate::config::FetchSettings;
use crate::domain::RawContent;
use crate::error::Result;
use crate::observability::metrics;

/// Browser-like HTTP fetcher with retries and exponential backoff
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_attempts: u32,
    backoff_base: Duration,
}

impl ReqwestFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            max_attempts: settings.max_retries.max(1),
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
        })
    }

    /// Delay before retry number `attempt` (zero-based): base * 2^attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl FetcherPort for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> RawContent {
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            let started = Instant::now();
            match self.attempt(url).await {
                Ok(body) => {
                    metrics::fetch::success();
                    metrics::fetch::duration(started.elapsed().as_secs_f64());
                    debug!(url, attempt = attempt + 1, bytes = body.len(), "page fetched");
                    return RawContent::Page(body);
                }
                Err(e) => {
                    warn!(url, attempt = attempt + 1, max_attempts = self.max_attempts, error = %e, "fetch attempt failed");
                    last_error = e;
                }
            }

            if attempt + 1 < self.max_attempts {
                metrics::fetch::retry();
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        metrics::fetch::failure();
        RawContent::failed(format!(
            "giving up after {} attempts: {}",
            self.max_attempts, last_error
        ))
    }
}
