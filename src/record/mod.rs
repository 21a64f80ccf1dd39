//! Record types produced by a crawl
//!
//! A [`CarRecord`] describes one modification of one vehicle model, assembled
//! in a single pass from one detail page. A crawl run aggregates all records
//! (and, in collect mode, all exhausted URLs) into a [`CrawlReport`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named technical-specification table: label → value
///
/// Keys are unique within a table; insertion order is irrelevant.
pub type SpecTable = HashMap<String, String>;

/// One vehicle modification extracted from a detail page
///
/// Every field defaults to empty. Construction never yields a partial record:
/// anything the page does not carry stays at its default, and the record as a
/// whole is only published once fully built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    pub brand: String,
    pub model: String,
    pub production_years: String,
    pub price: String,
    pub modification: String,
    pub description: String,

    pub engine: SpecTable,
    pub dynamics: SpecTable,
    pub transmission: SpecTable,
    pub chassis: SpecTable,
    pub body: SpecTable,
    pub steering: SpecTable,
    pub dimensions: SpecTable,
    pub other: SpecTable,
}

impl std::fmt::Display for CarRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.brand, self.model, self.modification)
    }
}

/// A URL whose fetch attempts were all exhausted
///
/// Only produced in collect mode (`continue-on-exhausted = true`); in the
/// default fail-fast mode the first exhausted URL aborts the run instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    pub error: String,
}

/// The aggregate result of one crawl run
///
/// Record order is not meaningful; records from concurrent fetches land in
/// completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub records: Vec<CarRecord>,
    pub failures: Vec<FetchFailure>,
}
