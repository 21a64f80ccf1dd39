//! Motormap main entry point
//!
//! This is the command-line interface for the Motormap catalog crawler.

use anyhow::Context;
use clap::Parser;
use motormap::config::load_config;
use motormap::crawler::crawl;
use motormap::output::{print_summary, write_records};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Motormap: a vehicle catalog crawler
///
/// Motormap crawls a paginated vehicle catalog, follows every model and
/// modification link, and exports one record per modification as JSON.
#[derive(Parser, Debug)]
#[command(name = "motormap")]
#[command(version)]
#[command(about = "A vehicle catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the crawl plan without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let report = crawl(config.clone()).await.context("crawl failed")?;

    write_records(std::path::Path::new(&config.output.records_path), &report.records)
        .context("failed to write records")?;
    print_summary(&report);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("motormap=info,warn"),
            1 => EnvFilter::new("motormap=debug,info"),
            2 => EnvFilter::new("motormap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn print_plan(config: &motormap::config::Config) {
    println!("=== Motormap Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Search URL: {}", config.site.search_url);
    println!("  Start page: {}", config.site.start_page);

    println!("\nCrawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Max fetch attempts: {}", config.crawler.max_fetch_attempts);
    println!("  Page block size: {}", config.crawler.page_block_size);
    println!(
        "  On exhausted fetch: {}",
        if config.crawler.continue_on_exhausted {
            "collect and continue"
        } else {
            "abort the run"
        }
    );
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    println!("\n✓ Configuration is valid");
}
