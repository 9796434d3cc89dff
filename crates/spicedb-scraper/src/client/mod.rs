//! Paced HTTP client shared by every vendor adapter.

mod origin;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use spicedb_core::AppConfig;

use crate::error::ScraperError;
use crate::rate_limit::RetryPolicy;

pub use origin::extract_origin;
pub(crate) use origin::extract_domain;

/// HTTP client that sleeps before every request and retries transient
/// failures.
///
/// Each call to [`get_text`](Self::get_text) or [`get_json`](Self::get_json)
/// first waits `min_delay + U[0, max_jitter)`. A 429 maps to
/// [`ScraperError::RateLimited`], a 404 to [`ScraperError::NotFound`], and
/// any other non-2xx status to [`ScraperError::UnexpectedStatus`]. 429s and
/// network failures are retried with exponential backoff.
pub struct PoliteClient {
    client: Client,
    retry: RetryPolicy,
    min_delay: Duration,
    max_jitter: Duration,
}

impl PoliteClient {
    /// Creates a client with no pacing. Use [`with_pacing`](Self::with_pacing)
    /// before pointing it at a real storefront.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy {
                max_retries,
                backoff_base_secs,
            },
            min_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        })
    }

    /// Builds a client from the scraper settings in `config`, with jitter
    /// taken from `scraper_max_jitter_ms` and no minimum delay.
    ///
    /// # Errors
    ///
    /// See [`PoliteClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )?;
        Ok(client.with_pacing(
            Duration::ZERO,
            Duration::from_millis(config.scraper_max_jitter_ms),
        ))
    }

    #[must_use]
    pub fn with_pacing(mut self, min_delay: Duration, max_jitter: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_jitter = max_jitter;
        self
    }

    #[must_use]
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    async fn pause(&self) {
        let jitter = self.max_jitter.mul_f64(rand::random::<f64>());
        let wait = self.min_delay + jitter;
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] — HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx (not retried).
    /// - [`ScraperError::Http`] — network or TLS failure after all retries.
    pub async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        self.pause().await;
        let referer = extract_origin(url);

        self.retry
            .run(|| {
                let referer = referer.clone();
                async move {
                    let response = self
                        .client
                        .get(url)
                        .header(
                            reqwest::header::ACCEPT,
                            "text/html,application/json;q=0.9,*/*;q=0.8",
                        )
                        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                        .header(reqwest::header::REFERER, referer)
                        .send()
                        .await?;
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.trim().parse::<u64>().ok())
                            .unwrap_or(60);
                        return Err(ScraperError::RateLimited {
                            domain: extract_domain(url),
                            retry_after_secs,
                        });
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ScraperError::NotFound {
                            url: url.to_owned(),
                        });
                    }

                    if !status.is_success() {
                        return Err(ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: url.to_owned(),
                        });
                    }

                    Ok(response.text().await?)
                }
            })
            .await
    }

    /// Fetches `url` and deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Everything [`get_text`](Self::get_text) returns, plus
    /// [`ScraperError::Deserialize`] when the body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScraperError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
            context: url.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
