use serde::Deserialize;

/// Main configuration structure for Motormap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Catalog site addresses and the starting page
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL that model and modification hrefs are joined onto
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Search page URL template, ending with the page query parameter
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// First catalog page to crawl
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent fetches per batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Fetch attempts per URL before giving up
    #[serde(rename = "max-fetch-attempts", default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Catalog pages per sequentially processed block
    #[serde(rename = "page-block-size", default = "default_page_block_size")]
    pub page_block_size: u32,

    /// Collect exhausted URLs and keep crawling instead of aborting
    #[serde(rename = "continue-on-exhausted", default)]
    pub continue_on_exhausted: bool,

    /// User agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_fetch_attempts: default_max_fetch_attempts(),
            page_block_size: default_page_block_size(),
            continue_on_exhausted: false,
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the JSON record export is written to
    #[serde(rename = "records-path", default = "default_records_path")]
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
        }
    }
}

fn default_start_page() -> u32 {
    1
}

fn default_concurrency() -> usize {
    50
}

fn default_max_fetch_attempts() -> u32 {
    3
}

fn default_page_block_size() -> u32 {
    20
}

fn default_user_agent() -> String {
    format!("motormap/{}", env!("CARGO_PKG_VERSION"))
}

fn default_records_path() -> String {
    "./records.json".to_string()
}
