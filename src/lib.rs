//! Motormap: a vehicle catalog crawler
//!
//! This crate crawls a paginated vehicle catalog site and assembles structured
//! records by following a three-level link hierarchy: catalog page → model
//! page → modification page → detail page. Fetching fans out with bounded
//! concurrency at every level, transient failures are retried a bounded number
//! of times, and the per-level results are aggregated into one flat report.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod url;

use thiserror::Error;

/// Main error type for Motormap operations
#[derive(Debug, Error)]
pub enum MotormapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("All {attempts} fetch attempts failed for {url}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        source: FetchError,
    },

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Record export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single fetch attempt
///
/// These are the transient errors the retry wrapper recovers from. They never
/// escape [`crawler::fetch_with_retry`] directly; once the attempt cap is
/// reached they are wrapped in [`MotormapError::FetchExhausted`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Motormap operations
pub type Result<T> = std::result::Result<T, MotormapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::run_crawl;
pub use record::{CarRecord, CrawlReport, FetchFailure, SpecTable};
