//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the scheduler and drives one page at a time through
//! fetch, link discovery and listing extraction, handing records to a sink.
//! Nothing that goes wrong with a single page or record stops the crawl.

use crate::config::Config;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::parser::parse_page;
use crate::crawler::scheduler::{Scheduler, StopReason};
use crate::extract::ListingExtractor;
use crate::state::{CrawlState, Pacer};
use crate::storage::ListingSink;
use crate::url::ScopePattern;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Counters for a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_fetched: u64,
    /// Dropped URLs keyed by [`FetchError::as_str`](crate::crawler::FetchError::as_str)
    pub fetch_failures: BTreeMap<&'static str, u64>,
    pub records_emitted: u64,
    /// Skipped cards keyed by [`SkipReason::as_str`](crate::SkipReason::as_str)
    pub skipped: BTreeMap<&'static str, u64>,
    pub sink_failures: u64,
    pub stop_reason: Option<StopReason>,
}

impl CrawlSummary {
    pub fn total_fetch_failures(&self) -> u64 {
        self.fetch_failures.values().sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher> {
    fetcher: F,
    scheduler: Scheduler,
    scope: ScopePattern,
    extractor: ListingExtractor,
    crawl_timestamp: DateTime<Utc>,
    state: CrawlState,
    #[cfg(test)]
    trail: Vec<CrawlState>,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator from the loaded configuration
    ///
    /// The crawl timestamp stamped on every record is captured here.
    pub fn new(config: &Config, fetcher: F) -> Result<Self, HarvestError> {
        let seed = config.search.seed_url()?;
        let scheduler = Scheduler::new(seed, &config.crawler);
        Ok(Self::with_parts(
            fetcher,
            scheduler,
            ScopePattern::new(&config.scope.pattern)?,
            ListingExtractor::new(&config.scope.listing_prefix)?,
        ))
    }

    /// Assembles a coordinator from already-built parts
    pub fn with_parts(
        fetcher: F,
        scheduler: Scheduler,
        scope: ScopePattern,
        extractor: ListingExtractor,
    ) -> Self {
        Self {
            fetcher,
            scheduler,
            scope,
            extractor,
            crawl_timestamp: Utc::now(),
            state: CrawlState::Idle,
            #[cfg(test)]
            trail: Vec::new(),
        }
    }

    /// Convenience constructor with no pacing and no budgets
    pub fn unpaced(
        seed: Url,
        fetcher: F,
        scope: ScopePattern,
        listing_prefix: &str,
    ) -> Result<Self, HarvestError> {
        let scheduler = Scheduler::with_limits(seed, Pacer::new(Duration::ZERO), None, None);
        Ok(Self::with_parts(
            fetcher,
            scheduler,
            scope,
            ListingExtractor::new(listing_prefix)?,
        ))
    }

    pub fn crawl_timestamp(&self) -> DateTime<Utc> {
        self.crawl_timestamp
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Controller {} -> {}", self.state, next);
        self.state = next;
        #[cfg(test)]
        self.trail.push(next);
        Ok(())
    }

    /// Runs the crawl until the frontier empties or a budget is hit
    ///
    /// The controller stays busy between pages and only returns to
    /// [`CrawlState::Idle`] once dispatch stops.
    pub async fn run(&mut self, sink: &mut dyn ListingSink) -> Result<CrawlSummary, HarvestError> {
        let mut summary = CrawlSummary::default();

        tracing::info!("Starting crawl at {}", self.crawl_timestamp.to_rfc3339());

        loop {
            let url = match self.scheduler.next_url().await {
                Ok(url) => url,
                Err(reason) => {
                    tracing::info!("Stopping crawl: {}", reason.as_str());
                    summary.stop_reason = Some(reason);
                    break;
                }
            };

            // a failed fetch leaves the controller in Fetching
            if self.state != CrawlState::Fetching {
                self.transition(CrawlState::Fetching)?;
            }
            tracing::debug!("Fetching {}", url);

            match self.fetcher.fetch(&url).await {
                Ok(page) => {
                    self.transition(CrawlState::Processing)?;
                    summary.pages_fetched += 1;
                    self.process_page(&url, page, sink, &mut summary);

                    if summary.pages_fetched % 10 == 0 {
                        let rate =
                            summary.pages_fetched as f64 / self.scheduler.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages fetched, {} records, {} in frontier, {:.2} pages/sec",
                            summary.pages_fetched,
                            summary.records_emitted,
                            self.scheduler.frontier_size(),
                            rate
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!("Dropping {}: {}", url, e);
                    *summary.fetch_failures.entry(e.as_str()).or_insert(0) += 1;
                }
            }
        }

        if self.state != CrawlState::Idle {
            self.transition(CrawlState::Idle)?;
        }

        if let Err(e) = sink.flush() {
            tracing::warn!("Failed to flush sink: {}", e);
            summary.sink_failures += 1;
        }

        tracing::info!(
            "Crawl completed: {} pages, {} records, {} skipped, {} fetch failures in {:?}",
            summary.pages_fetched,
            summary.records_emitted,
            summary.total_skipped(),
            summary.total_fetch_failures(),
            self.scheduler.elapsed()
        );

        Ok(summary)
    }

    /// Discovers links, then extracts every card on the page
    fn process_page(
        &mut self,
        requested: &Url,
        page: FetchedPage,
        sink: &mut dyn ListingSink,
        summary: &mut CrawlSummary,
    ) {
        if page.final_url != *requested {
            tracing::debug!("{} redirected to {}", requested, page.final_url);
            self.scheduler.mark_seen(&page.final_url);
        }

        let parsed = parse_page(
            &page.body,
            &page.final_url,
            &self.scope,
            &self.extractor,
            self.crawl_timestamp,
        );

        let added = self.scheduler.enqueue(parsed.links);
        tracing::debug!(
            "{}: {} new links, {} cards, {} index entries",
            page.final_url,
            added,
            parsed.outcomes.len(),
            parsed.index_len
        );

        for outcome in parsed.outcomes {
            match outcome {
                Ok(record) => match sink.accept(&record) {
                    Ok(()) => summary.records_emitted += 1,
                    Err(e) => {
                        tracing::warn!("Sink rejected {}: {}", record.url, e);
                        summary.sink_failures += 1;
                    }
                },
                Err(reason) => {
                    tracing::debug!("Skipped card on {}: {}", page.final_url, reason);
                    *summary.skipped.entry(reason.as_str()).or_insert(0) += 1;
                }
            }
        }
    }
}
