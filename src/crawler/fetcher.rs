//! HTTP fetching for results pages and article images
//!
//! [`WebFetcher`] is the shared HTTP layer:
//! - User-Agent rotation
//! - Rate limiting with governor
//! - Relative locators resolved against the site base URL
//! - Timeouts surfaced as [`FetchError::Timeout`]
//!
//! Requests are never retried; a failure is returned to the caller.
//!
//! [`HttpAssetFetcher`] builds the image download step on top of it.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response,
};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::FeedConfig;
use crate::utils::error::{AssetFetchError, FetchError};

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_IMAGE: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

/// Rate-limited HTTP client bound to one site
pub struct WebFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Site root used to resolve relative locators
    base_url: Url,

    /// Fixed User-Agent; rotates through the pool when unset
    user_agent: Option<String>,
}

impl WebFetcher {
    /// Create a fetcher with default timeout (30s)
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a malformed base URL and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(base_url: &str, requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(base_url, requests_per_second, Duration::from_secs(30), None)
    }

    /// Create a fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `base_url` - Site root, e.g. `https://www.latimes.com/`
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `timeout` - Request timeout duration
    /// * `user_agent` - Fixed User-Agent, or `None` to rotate
    pub fn with_config(
        base_url: &str,
        requests_per_second: u32,
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            base_url,
            user_agent,
        })
    }

    /// Build from the `[feed]` configuration section
    pub fn from_config(config: &FeedConfig) -> Result<Self, FetchError> {
        Self::with_config(
            &config.base_url,
            config.requests_per_second,
            config.request_timeout(),
            config.user_agent.clone(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a possibly relative locator against the base URL
    ///
    /// Absolute URLs are returned unchanged.
    pub fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(locator.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("{locator}: {e}")))
    }

    /// Fetch a page body as text
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Status` for non-2xx responses,
    /// `FetchError::Timeout` on timeout, `FetchError::Http` otherwise
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.send(url, ACCEPT_HTML).await?;
        response.text().await.map_err(FetchError::from_transport)
    }

    /// Fetch a binary body such as an image
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.send(url, ACCEPT_IMAGE).await?;
        let bytes = response.bytes().await.map_err(FetchError::from_transport)?;
        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &Url, accept: &'static str) -> Result<Response, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Fetching URL");

        let response = self
            .client
            .get(url.clone())
            .headers(self.build_headers(accept))
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response)
    }

    /// Build browser-like request headers
    fn build_headers(&self, accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = self
            .user_agent
            .as_deref()
            .and_then(|ua| HeaderValue::from_str(ua).ok())
            .unwrap_or_else(|| HeaderValue::from_static(self.random_user_agent()));
        headers.insert(USER_AGENT, user_agent);

        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

/// Retrieves a remote image into a local file
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download `uri` to `destination`, overwriting any existing file
    async fn fetch(&self, uri: &str, destination: &Path) -> Result<(), AssetFetchError>;
}

/// [`AssetFetcher`] backed by a shared [`WebFetcher`]
#[derive(Clone)]
pub struct HttpAssetFetcher {
    fetcher: Arc<WebFetcher>,
}

impl HttpAssetFetcher {
    pub fn new(fetcher: Arc<WebFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, uri: &str, destination: &Path) -> Result<(), AssetFetchError> {
        if uri.trim().is_empty() {
            return Err(AssetFetchError::MissingSource);
        }

        let url = self
            .fetcher
            .resolve(uri)
            .map_err(|e| AssetFetchError::InvalidUrl(e.to_string()))?;

        let bytes = self
            .fetcher
            .fetch_bytes(&url)
            .await
            .map_err(|source| AssetFetchError::Download {
                url: url.to_string(),
                source,
            })?;

        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| AssetFetchError::Write {
                path: destination.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            url = %url,
            path = %destination.display(),
            bytes = bytes.len(),
            "Saved image"
        );

        Ok(())
    }
}
