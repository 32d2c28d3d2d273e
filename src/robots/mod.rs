//! Robots.txt handling module
//!
//! Rules are fetched once per host and kept for the rest of the crawl. A
//! missing robots.txt, or one that cannot be fetched, allows everything.

mod parser;

pub use parser::RobotsRules;

use crate::url::extract_authority;
use std::collections::HashMap;
use url::Url;

/// Per-host robots.txt cache
#[derive(Debug, Default)]
pub struct RobotsCache {
    rules: HashMap<String, RobotsRules>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rules for `url`'s host, if already fetched
    pub fn get(&self, url: &Url) -> Option<&RobotsRules> {
        extract_authority(url).and_then(|authority| self.rules.get(&authority))
    }

    pub fn insert(&mut self, url: &Url, rules: RobotsRules) {
        if let Some(authority) = extract_authority(url) {
            self.rules.insert(authority, rules);
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks `url` against its host's rules, fetching them on first use
    pub async fn is_allowed(
        &mut self,
        client: &reqwest::Client,
        url: &Url,
        product_token: &str,
    ) -> bool {
        if self.get(url).is_none() {
            let rules = fetch_robots(client, url).await;
            self.insert(url, rules);
        }

        self.get(url)
            .map_or(true, |rules| rules.is_allowed(url.as_str(), product_token))
    }
}

/// Location of the robots.txt governing `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    url.host_str()?;
    let mut robots = url.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    Some(robots)
}

/// Fetches and wraps robots.txt for `url`'s host
///
/// Any failure, including a non-success status, yields allow-all rules.
pub async fn fetch_robots(client: &reqwest::Client, url: &Url) -> RobotsRules {
    let Some(location) = robots_url(url) else {
        return RobotsRules::allow_all();
    };

    let response = match client.get(location.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}; allowing all", location, e);
            return RobotsRules::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "No robots.txt at {} (HTTP {}); allowing all",
            location,
            response.status().as_u16()
        );
        return RobotsRules::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded robots.txt from {}", location);
            RobotsRules::from_content(&body)
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}; allowing all", location, e);
            RobotsRules::allow_all()
        }
    }
}
