//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - The robots.txt gate in front of every request
//! - Error classification (network, status, content type)

use crate::config::{Config, UserAgentConfig};
use crate::robots::RobotsCache;
use crate::HarvestError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Page body content
    pub body: String,
    /// Final URL after redirects
    pub final_url: Url,
}

/// Why a fetch produced no page; the URL is dropped either way
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("expected HTML from {url}, got '{content_type}'")]
    ContentType { url: String, content_type: String },

    #[error("{0} disallowed by robots.txt")]
    RobotsDenied(String),
}

impl FetchError {
    /// Short stable tag for logs and counters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::ContentType { .. } => "content_type",
            Self::RobotsDenied(_) => "robots_denied",
        }
    }
}

/// Source of pages for the crawl controller
///
/// Implementations are awaited one call at a time; the controller never has
/// two fetches in flight.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&mut self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Formats the crawler's user agent
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::UserAgentConfig;
/// use listing_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "HomeHunter".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`] with an optional robots.txt gate
pub struct HttpFetcher {
    client: Client,
    robots: Option<RobotsCache>,
    product_token: String,
}

impl HttpFetcher {
    /// Builds the client and robots gate from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        Ok(Self::new(
            client,
            &config.user_agent.crawler_name,
            config.crawler.obey_robots,
        ))
    }

    /// Wraps an existing client
    ///
    /// `product_token` is the name matched against robots.txt user-agent groups.
    pub fn new(client: Client, product_token: &str, obey_robots: bool) -> Self {
        Self {
            client,
            robots: obey_robots.then(RobotsCache::new),
            product_token: product_token.to_string(),
        }
    }

    pub fn obeys_robots(&self) -> bool {
        self.robots.is_some()
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<FetchedPage, FetchError> {
        if let Some(robots) = self.robots.as_mut() {
            if !robots.is_allowed(&self.client, url, &self.product_token).await {
                return Err(FetchError::RobotsDenied(url.to_string()));
            }
        }

        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                e.to_string()
            },
        };

        let response = self.client.get(url.as_str()).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // A missing Content-Type is given the benefit of the doubt
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Err(FetchError::ContentType {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(network)?;

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
            final_url,
        })
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
