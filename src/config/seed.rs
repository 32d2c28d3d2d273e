//! Seed URL construction from search filters

use crate::config::types::SearchConfig;
use crate::ConfigError;
use url::Url;

/// Search root used when `base-url` is not configured
pub const DEFAULT_SEARCH_BASE: &str = "https://www.trulia.com/for_rent";

impl SearchConfig {
    /// Returns the seed URL for the crawl
    ///
    /// An explicit `seed-url` wins. Otherwise each configured filter becomes a
    /// path segment after the base URL, in a fixed order: region, beds, baths,
    /// price, sqft, property type. The result always ends with `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_harvest::config::SearchConfig;
    ///
    /// let search = SearchConfig {
    ///     region: Some("06037_c".to_string()),
    ///     min_beds: Some(3),
    ///     min_price: Some(3500),
    ///     max_price: Some(10500),
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     search.seed_url().unwrap().as_str(),
    ///     "https://www.trulia.com/for_rent/06037_c/3p_beds/3500-10500_price/"
    /// );
    /// ```
    pub fn seed_url(&self) -> Result<Url, ConfigError> {
        if let Some(seed) = &self.seed_url {
            return Url::parse(seed)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed-url '{}': {}", seed, e)));
        }

        let base = self.base_url.as_deref().unwrap_or(DEFAULT_SEARCH_BASE);
        let mut path = base.trim_end_matches('/').to_string();

        for segment in self.filter_segments() {
            path.push('/');
            path.push_str(&segment);
        }
        path.push('/');

        Url::parse(&path)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search URL '{}': {}", path, e)))
    }

    fn filter_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();

        if let Some(region) = &self.region {
            segments.push(region.trim_matches('/').to_string());
        }
        if let Some(beds) = self.min_beds {
            segments.push(format!("{}p_beds", beds));
        }
        if let Some(baths) = self.min_baths {
            segments.push(format!("{}p_baths", baths));
        }
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => segments.push(format!("{}-{}_price", min, max)),
            (Some(min), None) => segments.push(format!("{}p_price", min)),
            (None, Some(max)) => segments.push(format!("0-{}_price", max)),
            (None, None) => {}
        }
        if let Some(sqft) = self.min_sqft {
            segments.push(format!("{}p_sqft", sqft));
        }
        if let Some(kind) = &self.property_type {
            segments.push(format!("{}_type", kind));
        }

        segments
    }
}
