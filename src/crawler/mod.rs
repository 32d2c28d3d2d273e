//! Crawler module for fetching and processing result pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait, with a robots.txt gate
//! - Per-page parsing into links and listing outcomes
//! - The FIFO frontier, pacing and stop budgets
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, user_agent_string, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{parse_page, ParsedPage};
pub use scheduler::{Frontier, Scheduler, StopReason};

use crate::config::Config;
use crate::storage::ListingSink;
use crate::HarvestError;

/// Runs a complete crawl over HTTP
///
/// Builds the HTTP fetcher and coordinator from `config`, then drives the
/// crawl until the frontier is empty or a budget runs out.
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::load_config;
/// use listing_harvest::crawler::crawl;
/// use listing_harvest::ListingRecord;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let mut records: Vec<ListingRecord> = Vec::new();
/// let summary = crawl(&config, &mut records).await?;
/// println!("{} records", summary.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, sink: &mut dyn ListingSink) -> Result<CrawlSummary, HarvestError> {
    let fetcher = HttpFetcher::from_config(config)?;
    let mut coordinator = Coordinator::new(config, fetcher)?;
    coordinator.run(sink).await
}
