//! Crawl frontier and dispatch scheduling
//!
//! This module handles:
//! - The FIFO frontier of pending URLs and the visited set
//! - Pacing between successive dispatches
//! - The request and wall-clock stop budgets

use crate::config::CrawlerConfig;
use crate::state::Pacer;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// FIFO queue of pending URLs plus everything already queued or dispatched
///
/// A URL is identified by its absolute form without fragment. Once pushed it
/// can never be pushed again, so no URL is dispatched twice.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
    dispatched: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed
    pub fn seeded(seed: Url) -> Self {
        let mut frontier = Self::new();
        frontier.push_if_new(seed);
        frontier
    }

    fn key(url: &Url) -> Url {
        let mut key = url.clone();
        key.set_fragment(None);
        key
    }

    /// Queues `url` unless it was queued or dispatched before
    ///
    /// Returns true if the URL was added.
    pub fn push_if_new(&mut self, url: Url) -> bool {
        let url = Self::key(&url);
        if self.seen.insert(url.as_str().to_string()) {
            self.queue.push_back(url);
            true
        } else {
            false
        }
    }

    /// Marks a URL as known without queueing it (e.g. a redirect target)
    pub fn mark_seen(&mut self, url: &Url) {
        self.seen.insert(Self::key(url).as_str().to_string());
    }

    /// Removes the oldest pending URL
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.dispatched += 1;
        Some(url)
    }

    /// Number of URLs waiting to be dispatched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs handed out so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

/// Why the scheduler stopped handing out URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrontierExhausted,
    RequestBudget,
    DurationBudget,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrontierExhausted => "frontier_exhausted",
            Self::RequestBudget => "request_budget",
            Self::DurationBudget => "duration_budget",
        }
    }
}

/// Hands out frontier URLs at the configured pace until a budget runs out
pub struct Scheduler {
    frontier: Frontier,
    pacer: Pacer,
    max_requests: Option<u32>,
    max_duration: Option<Duration>,
    started: Instant,
}

impl Scheduler {
    pub fn new(seed: Url, config: &CrawlerConfig) -> Self {
        Self::with_limits(
            seed,
            Pacer::from_millis(config.minimum_delay_ms),
            config.max_requests,
            config.max_duration_secs.map(Duration::from_secs),
        )
    }

    pub fn with_limits(
        seed: Url,
        pacer: Pacer,
        max_requests: Option<u32>,
        max_duration: Option<Duration>,
    ) -> Self {
        Self {
            frontier: Frontier::seeded(seed),
            pacer,
            max_requests,
            max_duration,
            started: Instant::now(),
        }
    }

    /// Checks both stop budgets as of `now`
    ///
    /// The wall-clock budget accounts for the pacing delay still owed, so a
    /// dispatch that could only happen after the deadline is not started.
    pub fn budget_exhausted(&self, now: Instant) -> Option<StopReason> {
        if let Some(max) = self.max_requests {
            if self.pacer.dispatched() >= max {
                return Some(StopReason::RequestBudget);
            }
        }

        if let Some(max) = self.max_duration {
            let wait = self.pacer.time_until_next(now).unwrap_or_default();
            if now.saturating_duration_since(self.started) + wait >= max {
                return Some(StopReason::DurationBudget);
            }
        }

        None
    }

    /// Returns the next URL to fetch, waiting out the pacing delay first
    pub async fn next_url(&mut self) -> Result<Url, StopReason> {
        if let Some(reason) = self.budget_exhausted(Instant::now()) {
            return Err(reason);
        }

        let url = self.frontier.pop().ok_or(StopReason::FrontierExhausted)?;
        self.pacer.wait().await;
        Ok(url)
    }

    /// Queues newly discovered URLs, returning how many were actually new
    pub fn enqueue<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        urls.into_iter()
            .filter(|url| self.frontier.push_if_new(url.clone()))
            .count()
    }

    pub fn mark_seen(&mut self, url: &Url) {
        self.frontier.mark_seen(url);
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Number of fetches dispatched so far
    pub fn dispatched(&self) -> u32 {
        self.pacer.dispatched()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
