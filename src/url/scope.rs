use regex::Regex;
use url::Url;

/// Scope rule used when no pattern is configured: paginated rental search
/// results on a single host
pub const DEFAULT_SCOPE_PATTERN: &str = r"^https://www\.trulia\.com/for_rent/.+/\d+_p/";

/// Decides which absolute URLs are eligible for traversal
///
/// The pattern is matched against the full serialized URL, so it can pin the
/// scheme, host and path shape at once.
#[derive(Debug, Clone)]
pub struct ScopePattern {
    pattern: Regex,
}

impl ScopePattern {
    /// Compiles a scope pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns true if the URL is in scope
    pub fn matches(&self, url: &Url) -> bool {
        self.pattern.is_match(url.as_str())
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
