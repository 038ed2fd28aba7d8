//! Page loading collaborators used by the collectors.
//!
//! [`HttpPageFetcher`] issues plain GET requests. [`RenderedPageFetcher`]
//! delegates to a headless-browser rendering service exposing a
//! Browserless-style `POST /content` endpoint, for sources that only
//! populate their markup client-side.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use viralimg_core::AppConfig;

use crate::error::SourceError;
use crate::rate_limit::retry_with_backoff;

/// Loads a URL and returns its (possibly rendered) HTML or XML body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;

    fn name(&self) -> &str;
}

/// Direct HTTP GET with timeout, browser-like headers, and retry on
/// transient failures.
pub struct HttpPageFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpPageFetcher {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9,en-US;q=0.8")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(SourceError::RateLimited {
                    url: url.to_string(),
                    retry_after_secs,
                });
            }
            if !status.is_success() {
                return Err(SourceError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Fetches fully rendered HTML through a rendering service.
pub struct RenderedPageFetcher {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RenderedPageFetcher {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let mut endpoint = format!("{}/content", base_url.trim_end_matches('/'));
        if let Some(token) = token {
            endpoint.push_str("?token=");
            endpoint.extend(utf8_percent_encode(token, NON_ALPHANUMERIC));
        }

        Ok(Self {
            client,
            endpoint,
            max_retries,
            backoff_base_ms,
        })
    }
}

#[async_trait]
impl PageFetcher for RenderedPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let body = serde_json::json!({ "url": url });
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let body = body.clone();
            async move {
                let response = self
                    .client
                    .post(&self.endpoint)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(SourceError::Render {
                        status: status.as_u16(),
                        message,
                    });
                }
                Ok(response.text().await?)
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "renderer"
    }
}

/// Build the page fetcher selected by configuration: the rendering service
/// when `renderer_url` is set, direct HTTP otherwise.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
pub fn build_page_fetcher(config: &AppConfig) -> Result<Arc<dyn PageFetcher>, SourceError> {
    if let Some(renderer_url) = &config.renderer_url {
        tracing::info!(renderer = %renderer_url, "using rendering service for page loads");
        let fetcher = RenderedPageFetcher::new(
            renderer_url,
            config.renderer_token.as_deref(),
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        return Ok(Arc::new(fetcher));
    }

    let fetcher = HttpPageFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?;
    Ok(Arc::new(fetcher))
}
