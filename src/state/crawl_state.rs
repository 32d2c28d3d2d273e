/// Crawl controller states
///
/// The controller is always in exactly one of these states. Legal moves are
/// `Idle -> Fetching -> Processing -> Fetching | Idle`.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Nothing dispatched; either not started or finished
    Idle,

    /// A single fetch is in flight
    Fetching,

    /// The last fetched page is being parsed and extracted
    Processing,
}

impl CrawlState {
    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Processing)
                | (Self::Fetching, Self::Idle)
                | (Self::Processing, Self::Fetching)
                | (Self::Processing, Self::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
        }
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Fetching));
        assert!(CrawlState::Fetching.can_transition_to(CrawlState::Processing));
        assert!(CrawlState::Processing.can_transition_to(CrawlState::Fetching));
        assert!(CrawlState::Processing.can_transition_to(CrawlState::Idle));
    }

    #[test]
    fn test_failed_fetch_returns_to_idle() {
        assert!(CrawlState::Fetching.can_transition_to(CrawlState::Idle));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Processing));
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Idle));
        assert!(!CrawlState::Fetching.can_transition_to(CrawlState::Fetching));
        assert!(!CrawlState::Processing.can_transition_to(CrawlState::Processing));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlState::Idle), "idle");
        assert_eq!(format!("{}", CrawlState::Processing), "processing");
        assert_eq!(CrawlState::default(), CrawlState::Idle);
    }
}
