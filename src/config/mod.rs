//! Configuration module for Motormap
//!
//! Configuration is loaded from a TOML file, validated, and passed into the
//! crawler as an explicit immutable value; there is no process-wide mutable
//! configuration state.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
pub use validation::validate;
