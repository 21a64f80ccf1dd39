//! HTTP fetching for the crawler
//!
//! This module handles document retrieval:
//! - Building the HTTP client with a proper user agent string
//! - The [`DocumentFetcher`] interface the rest of the crawler consumes
//! - Bounded retry of transient fetch failures
//!
//! A fetched [`Document`] carries the raw body as a string; HTML parsing
//! happens inside the synchronous extraction calls so that spawned fetch
//! futures stay `Send`.

use crate::config::CrawlerConfig;
use crate::{FetchError, MotormapError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Document {
    /// The URL the document was fetched from
    pub url: String,

    /// Raw response body
    pub body: String,
}

/// Single-attempt document retrieval
///
/// One call is one fetch attempt; implementations perform no retries of their
/// own. The crawler consumes this interface exclusively through
/// [`fetch_with_retry`], so a scripted test double slots in wherever the real
/// HTTP fetcher does.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Document, FetchError>;
}

/// Builds the shared HTTP client
///
/// The request timeout caps how long a single fetch attempt can block, so a
/// hung connection counts as one failed attempt rather than stalling the
/// whole crawl.
pub fn build_http_client(user_agent: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`DocumentFetcher`] backed by a reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client configured from the crawler config
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(&config.user_agent)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Document, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(Document {
            url: url.to_string(),
            body,
        })
    }
}

/// Fetches a URL, retrying transient failures up to `max_attempts` times
///
/// The attempt counter starts at 1; each failed attempt is retried
/// immediately until the cap is reached, at which point the call fails
/// terminally with [`MotormapError::FetchExhausted`] carrying the URL and the
/// last attempt's error. An explicit loop keeps stack and task depth constant
/// no matter how many attempts are configured.
///
/// Only fetch-level failures are retried here; a successfully fetched page
/// whose markup turns out to be empty is not a failure at this layer.
pub async fn fetch_with_retry(
    fetcher: &dyn DocumentFetcher,
    url: &str,
    max_attempts: u32,
) -> Result<Document> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match fetcher.fetch(url).await {
            Ok(document) => return Ok(document),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(MotormapError::FetchExhausted {
                        url: url.to_string(),
                        attempts: max_attempts,
                        source: error,
                    });
                }

                tracing::debug!(
                    "Fetch attempt {}/{} failed for {}: {}",
                    attempt,
                    max_attempts,
                    url,
                    error
                );
                attempt += 1;
            }
        }
    }
}
