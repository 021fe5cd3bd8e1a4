//! HTTP client for fetching listing pages
//!
//! One GET per site with a bounded timeout. Non-success statuses, timeouts
//! and unreadable bodies all come back as typed [`ScrapeError`]s; nothing is
//! retried.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, redirect};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::infrastructure::config::{ScraperConfig, defaults};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the scraper section
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.request_timeout_seconds,
            user_agent: scraper.user_agent.clone(),
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

/// Source of listing page bodies
///
/// The site scraper only needs "URL in, body text out"; tests substitute
/// canned pages through this trait.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> ScrapeResult<String>;
}

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a client with default settings
    pub fn new() -> reqwest::Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> reqwest::Result<Self> {
        let redirect_policy = if config.follow_redirects {
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .redirect(redirect_policy)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn transport_error(&self, url: &Url, error: &reqwest::Error) -> ScrapeError {
        if error.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                seconds: self.config.timeout_seconds,
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &Url) -> ScrapeResult<String> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(url, &e)
            } else {
                ScrapeError::BodyRead {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
