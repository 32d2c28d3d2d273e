use crate::url::{DEFAULT_LISTING_PREFIX, DEFAULT_SCOPE_PATTERN};
use serde::Deserialize;

/// Main configuration structure for Listing Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    pub search: SearchConfig,
}

/// Crawler pacing and budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between two fetch dispatches (milliseconds)
    #[serde(rename = "minimum-delay-ms")]
    pub minimum_delay_ms: u64,

    /// Stop dispatching after this many fetches
    #[serde(rename = "max-requests", default)]
    pub max_requests: Option<u32>,

    /// Stop dispatching once the crawl has run this long (seconds)
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: Option<u64>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Check robots.txt before fetching
    #[serde(rename = "obey-robots", default = "default_true")]
    pub obey_robots: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional JSON-lines file receiving every record as well
    #[serde(rename = "jsonl-path", default)]
    pub jsonl_path: Option<String>,
}

/// Which pages are crawled and which links count as listings
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Regex matched against absolute URLs found on result pages
    #[serde(default = "default_scope_pattern")]
    pub pattern: String,

    /// Path prefix of individual listing pages
    #[serde(rename = "listing-prefix", default = "default_listing_prefix")]
    pub listing_prefix: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            pattern: default_scope_pattern(),
            listing_prefix: default_listing_prefix(),
        }
    }
}

/// Where the crawl starts
///
/// Either `seed-url` is given verbatim, or the seed is assembled from
/// `base-url` and the search filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    #[serde(rename = "seed-url", default)]
    pub seed_url: Option<String>,

    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    /// Region slug, e.g. a county code like `06037_c`
    #[serde(default)]
    pub region: Option<String>,

    #[serde(rename = "min-beds", default)]
    pub min_beds: Option<u32>,

    #[serde(rename = "min-baths", default)]
    pub min_baths: Option<u32>,

    #[serde(rename = "min-price", default)]
    pub min_price: Option<u32>,

    #[serde(rename = "max-price", default)]
    pub max_price: Option<u32>,

    #[serde(rename = "min-sqft", default)]
    pub min_sqft: Option<u32>,

    /// Property type slug, e.g. `SINGLE-FAMILY_HOME`
    #[serde(rename = "property-type", default)]
    pub property_type: Option<String>,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_scope_pattern() -> String {
    DEFAULT_SCOPE_PATTERN.to_string()
}

fn default_listing_prefix() -> String {
    DEFAULT_LISTING_PREFIX.to_string()
}
