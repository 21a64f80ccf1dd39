//! Crawl output
//!
//! Records are exported as a pretty-printed JSON array; the run summary is
//! printed to stdout.

use crate::record::{CarRecord, CrawlReport};
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes all records to a JSON file
pub fn write_records(path: &Path, records: &[CarRecord]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Prints a human-readable summary of a finished crawl
pub fn print_summary(report: &CrawlReport) {
    println!("Crawl finished: {} records", report.records.len());

    if !report.failures.is_empty() {
        println!("{} URLs exhausted all fetch attempts:", report.failures.len());
        for failure in &report.failures {
            println!(
                "  - {} ({} attempts): {}",
                failure.url, failure.attempts, failure.error
            );
        }
    }
}
