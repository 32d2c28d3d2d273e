//! Robots.txt rule matching backed by the robotstxt crate

use robotstxt::DefaultMatcher;

/// Robots.txt rules for a single host
///
/// An empty body means everything is allowed.
#[derive(Debug, Clone)]
pub struct RobotsRules {
    content: String,
    allow_all: bool,
}

impl RobotsRules {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Rules used when robots.txt is missing or could not be fetched
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    pub fn is_allow_all(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks whether `url` may be fetched by `product_token`
    ///
    /// `url` may be absolute or a bare path.
    pub fn is_allowed(&self, url: &str, product_token: &str) -> bool {
        if self.is_allow_all() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = RobotsRules::allow_all();
        assert!(robots.is_allow_all());
        assert!(robots.is_allowed("/for_rent/CA/", "HomeHunter"));
    }

    #[test]
    fn test_disallow_listing_pages() {
        let robots = RobotsRules::from_content("User-agent: *\nDisallow: /p/");
        assert!(robots.is_allowed("https://site.test/for_rent/CA/", "HomeHunter"));
        assert!(!robots.is_allowed("https://site.test/p/ca/123", "HomeHunter"));
    }

    #[test]
    fn test_allow_overrides_broader_disallow() {
        let content = "User-agent: *\nDisallow: /for_rent\nAllow: /for_rent/CA/";
        let robots = RobotsRules::from_content(content);
        assert!(!robots.is_allowed("/for_rent/NY/", "HomeHunter"));
        assert!(robots.is_allowed("/for_rent/CA/2_p/", "HomeHunter"));
    }

    #[test]
    fn test_agent_specific_group() {
        let content = "User-agent: HomeHunter\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = RobotsRules::from_content(content);
        assert!(!robots.is_allowed("/for_rent/", "HomeHunter"));
        assert!(robots.is_allowed("/for_rent/", "OtherBot"));
    }

    #[test]
    fn test_garbage_and_empty_content_allow() {
        assert!(RobotsRules::from_content("not robots {{{").is_allowed("/x", "HomeHunter"));
        assert!(RobotsRules::from_content("  \n").is_allow_all());
    }
}
