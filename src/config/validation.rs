use crate::config::types::{Config, CrawlerConfig, OutputConfig, ScopeConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_scope_config(&config.scope)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.minimum_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "minimum-delay-ms must be >= 100ms, got {}ms",
            config.minimum_delay_ms
        )));
    }

    if let Some(max) = config.max_requests {
        if max < 1 {
            return Err(ConfigError::Validation(format!(
                "max-requests must be >= 1, got {}",
                max
            )));
        }
    }

    if config.max_duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max-duration-secs must be >= 1 when set".to_string(),
        ));
    }

    if !(1..=300).contains(&config.request_timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if matches!(config.jsonl_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "jsonl-path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the scope regex and the listing path prefix
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    Regex::new(&config.pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!("'{}': {}", config.pattern, e))
    })?;

    let prefix = &config.listing_prefix;
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing-prefix must start and end with '/', got '{}'",
            prefix
        )));
    }

    Ok(())
}

/// Validates that a usable seed URL can be produced
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if let (Some(min), Some(max)) = (config.min_price, config.max_price) {
        if min > max {
            return Err(ConfigError::Validation(format!(
                "min-price ({}) must not exceed max-price ({})",
                min, max
            )));
        }
    }

    if config.seed_url.is_none() && config.region.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::Validation(
            "[search] needs either seed-url or region".to_string(),
        ));
    }

    let seed = config.seed_url()?;
    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
