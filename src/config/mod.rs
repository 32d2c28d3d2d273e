//! Configuration module for Listing Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and building the crawl's seed URL from search filters.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Seed: {}", config.search.seed_url().unwrap());
//! ```

mod parser;
mod seed;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, ScopeConfig, SearchConfig, UserAgentConfig};

pub use seed::DEFAULT_SEARCH_BASE;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
