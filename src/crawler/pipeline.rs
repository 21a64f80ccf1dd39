//! Crawl pipeline - main orchestration logic
//!
//! The pipeline sequences the crawl's five stages, wiring each stage's output
//! into the next stage's fan-out:
//!
//! 1. Discover the catalog page count from the first search page
//! 2. Fetch all catalog pages, block by block
//! 3. Extract model links from each catalog page
//! 4. Fetch model pages and extract modification links
//! 5. Fetch detail pages and build records
//!
//! All fan-out goes through [`run_batched`] and every fetch through
//! [`fetch_with_retry`], so one concurrency limit and one retry cap govern
//! the whole run. With a limit of 1 the pipeline degenerates to a fully
//! synchronous crawl over the same code path.

use crate::config::Config;
use crate::crawler::batch::run_batched;
use crate::crawler::extract::{CatalogExtractor, MailRuExtractor};
use crate::crawler::fetcher::{fetch_with_retry, Document, DocumentFetcher, HttpFetcher};
use crate::record::{CarRecord, CrawlReport, FetchFailure};
use crate::url::{catalog_page_url, is_blank, resolve_url};
use crate::{MotormapError, Result};
use std::sync::Arc;

/// An inclusive range of catalog page numbers
///
/// Holds the invariant `first <= last`; constructing with a smaller `last`
/// clamps it up to `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    first: u32,
    last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            first,
            last: last.max(first),
        }
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    /// Number of pages in the range (always at least 1)
    pub fn page_count(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    /// Iterates the page numbers in order
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }

    /// Partitions the range into consecutive blocks of at most `size` pages
    ///
    /// The last block may be smaller. Blocks are processed sequentially by
    /// the pipeline so that only one block's documents are pending at a time.
    pub fn blocks(&self, size: u32) -> Vec<PageRange> {
        let size = size.max(1);
        let mut blocks = Vec::new();
        let mut first = self.first;

        while first <= self.last {
            let last = self.last.min(first.saturating_add(size - 1));
            blocks.push(PageRange { first, last });
            match last.checked_add(1) {
                Some(next) => first = next,
                None => break,
            }
        }

        blocks
    }
}

/// The crawl orchestrator
///
/// Owns the configuration and the two collaborators the core delegates to:
/// the document fetcher and the markup extractor. Tests inject scripted
/// implementations of both; [`run_crawl`] wires up the real ones.
pub struct Pipeline {
    config: Arc<Config>,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn CatalogExtractor>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<dyn CatalogExtractor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            extractor,
        }
    }

    /// Runs the full crawl and aggregates all records into one report
    ///
    /// In the default fail-fast mode the first exhausted URL aborts the run
    /// with [`MotormapError::FetchExhausted`] once its batch group has
    /// completed. With `continue-on-exhausted` set, exhausted URLs are
    /// recorded in the report's `failures` and their branches simply
    /// contribute no records. Worker task failures are fatal in both modes.
    pub async fn run(&self) -> Result<CrawlReport> {
        let mut failures = Vec::new();

        let range = PageRange::new(self.config.site.start_page, self.discover_last_page().await?);
        tracing::info!(
            "Crawling catalog pages {}..={}",
            range.first(),
            range.last()
        );

        let mut model_links: Vec<String> = Vec::new();
        for block in range.blocks(self.config.crawler.page_block_size) {
            tracing::debug!(
                "Fetching catalog page block {}..={}",
                block.first(),
                block.last()
            );

            let documents = self.fetch_catalog_block(block, &mut failures).await?;
            for document in &documents {
                for href in self.extractor.model_links(document) {
                    if !is_blank(&href) {
                        model_links.push(href);
                    }
                }
            }
        }
        tracing::info!("Discovered {} model links", model_links.len());

        let modification_links = self
            .fetch_modification_links(model_links, &mut failures)
            .await?;
        tracing::info!("Discovered {} modification links", modification_links.len());

        let records = self.fetch_records(modification_links, &mut failures).await?;
        tracing::info!(
            "Built {} records, {} URLs exhausted",
            records.len(),
            failures.len()
        );

        Ok(CrawlReport { records, failures })
    }

    /// Stage 1: reads the last-page control from the first search page
    ///
    /// An absent or non-numeric control means the catalog fits on the start
    /// page, as does a control pointing before it. Discovery failure is fatal
    /// in both failure modes - without a page count there is nothing to fan
    /// out over.
    async fn discover_last_page(&self) -> Result<u32> {
        let start_page = self.config.site.start_page;
        let url = catalog_page_url(&self.config.site.search_url, start_page);
        let document =
            fetch_with_retry(&*self.fetcher, &url, self.config.crawler.max_fetch_attempts).await?;

        match self.extractor.last_page(&document) {
            Some(last) if last >= start_page => Ok(last),
            Some(last) => {
                tracing::warn!(
                    "Last-page control reads {}, before start page {}",
                    last,
                    start_page
                );
                Ok(start_page)
            }
            None => {
                tracing::info!("No usable last-page control, crawling the start page only");
                Ok(start_page)
            }
        }
    }

    /// Stage 2: fetches one block of catalog pages concurrently
    async fn fetch_catalog_block(
        &self,
        block: PageRange,
        failures: &mut Vec<FetchFailure>,
    ) -> Result<Vec<Document>> {
        let fetcher = Arc::clone(&self.fetcher);
        let search_url = self.config.site.search_url.clone();
        let attempts = self.config.crawler.max_fetch_attempts;

        let pages: Vec<u32> = block.pages().collect();
        let outcomes = run_batched(pages, self.config.crawler.concurrency, move |page| {
            let fetcher = Arc::clone(&fetcher);
            let url = catalog_page_url(&search_url, page);
            async move { fetch_with_retry(&*fetcher, &url, attempts).await }
        })
        .await;

        self.gather(outcomes, failures)
    }

    /// Stage 4: fetches model pages and extracts their modification links
    ///
    /// Each task resolves its href against the site base URL; blank hrefs
    /// contribute zero links rather than an error.
    async fn fetch_modification_links(
        &self,
        model_links: Vec<String>,
        failures: &mut Vec<FetchFailure>,
    ) -> Result<Vec<String>> {
        let fetcher = Arc::clone(&self.fetcher);
        let extractor = Arc::clone(&self.extractor);
        let base_url = self.config.site.base_url.clone();
        let attempts = self.config.crawler.max_fetch_attempts;

        let outcomes = run_batched(
            model_links,
            self.config.crawler.concurrency,
            move |href| {
                let fetcher = Arc::clone(&fetcher);
                let extractor = Arc::clone(&extractor);
                let base_url = base_url.clone();
                async move {
                    let Some(url) = resolve_url(&base_url, &href) else {
                        return Ok(Vec::new());
                    };
                    let document = fetch_with_retry(&*fetcher, &url, attempts).await?;
                    Ok(extractor.modification_links(&document))
                }
            },
        )
        .await;

        let links = self.gather(outcomes, failures)?;
        Ok(links
            .into_iter()
            .flatten()
            .filter(|href| !is_blank(href))
            .collect())
    }

    /// Stage 5: fetches detail pages and builds one record per page
    async fn fetch_records(
        &self,
        modification_links: Vec<String>,
        failures: &mut Vec<FetchFailure>,
    ) -> Result<Vec<CarRecord>> {
        let fetcher = Arc::clone(&self.fetcher);
        let extractor = Arc::clone(&self.extractor);
        let base_url = self.config.site.base_url.clone();
        let attempts = self.config.crawler.max_fetch_attempts;

        let outcomes = run_batched(
            modification_links,
            self.config.crawler.concurrency,
            move |href| {
                let fetcher = Arc::clone(&fetcher);
                let extractor = Arc::clone(&extractor);
                let base_url = base_url.clone();
                async move {
                    let Some(url) = resolve_url(&base_url, &href) else {
                        return Ok(None);
                    };
                    let document = fetch_with_retry(&*fetcher, &url, attempts).await?;
                    Ok(Some(extractor.record(&document)))
                }
            },
        )
        .await;

        let records = self.gather(outcomes, failures)?;
        Ok(records.into_iter().flatten().collect())
    }

    /// Applies the configured failure policy to one batch's outcomes
    ///
    /// Aggregation happens here, single-threaded, after each task has fully
    /// computed its own output - concurrent tasks never touch shared state.
    fn gather<T>(
        &self,
        outcomes: Vec<Result<T>>,
        failures: &mut Vec<FetchFailure>,
    ) -> Result<Vec<T>> {
        let continue_on_exhausted = self.config.crawler.continue_on_exhausted;
        let mut values = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            match outcome {
                Ok(value) => values.push(value),
                Err(MotormapError::FetchExhausted {
                    url,
                    attempts,
                    source,
                }) if continue_on_exhausted => {
                    tracing::warn!("Giving up on {} after {} attempts: {}", url, attempts, source);
                    failures.push(FetchFailure {
                        url,
                        attempts,
                        error: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(values)
    }
}

/// Runs the main crawl operation
///
/// Builds the HTTP fetcher and the site extractor from the configuration and
/// runs the pipeline to completion.
///
/// # Example
///
/// ```no_run
/// use motormap::config::load_config;
/// use motormap::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let pipeline = Pipeline::new(config, fetcher, Arc::new(MailRuExtractor));
    pipeline.run().await
}
