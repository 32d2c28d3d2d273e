use std::time::{Duration, Instant};

/// Enforces a minimum delay between successive fetch dispatches
///
/// Pacing is global to the crawl rather than per host: there is only ever
/// one logical request stream.
#[derive(Debug, Clone)]
pub struct Pacer {
    minimum_delay: Duration,
    last_dispatch: Option<Instant>,
    dispatched: u32,
}

impl Pacer {
    pub fn new(minimum_delay: Duration) -> Self {
        Self {
            minimum_delay,
            last_dispatch: None,
            dispatched: 0,
        }
    }

    pub fn from_millis(minimum_delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(minimum_delay_ms))
    }

    /// Calculates the time until the next dispatch is allowed
    ///
    /// Returns None if a dispatch can happen now.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let last = self.last_dispatch?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.minimum_delay {
            Some(self.minimum_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a fetch was dispatched at `now`
    pub fn record_dispatch(&mut self, now: Instant) {
        self.dispatched += 1;
        self.last_dispatch = Some(now);
    }

    /// Waits out the remaining delay, then records the dispatch
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_next(Instant::now()) {
            tracing::trace!("Pacing: sleeping {}ms before next fetch", remaining.as_millis());
            tokio::time::sleep(remaining).await;
        }
        self.record_dispatch(Instant::now());
    }

    /// Number of dispatches recorded so far
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    pub fn minimum_delay(&self) -> Duration {
        self.minimum_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_dispatch_is_immediate() {
        let pacer = Pacer::from_millis(1000);
        assert!(pacer.time_until_next(Instant::now()).is_none());
    }

    #[test]
    fn test_time_until_next() {
        let mut pacer = Pacer::from_millis(1000);
        let now = Instant::now();
        pacer.record_dispatch(now);

        assert_eq!(pacer.time_until_next(now), Some(Duration::from_millis(1000)));

        let soon = now + Duration::from_millis(400);
        assert_eq!(pacer.time_until_next(soon), Some(Duration::from_millis(600)));

        let later = now + Duration::from_millis(1100);
        assert!(pacer.time_until_next(later).is_none());
    }

    #[test]
    fn test_record_dispatch_counts() {
        let mut pacer = Pacer::from_millis(100);
        assert_eq!(pacer.dispatched(), 0);
        pacer.record_dispatch(Instant::now());
        pacer.record_dispatch(Instant::now());
        assert_eq!(pacer.dispatched(), 2);
    }

    #[tokio::test]
    async fn test_wait_respects_minimum_delay() {
        let mut pacer = Pacer::from_millis(50);
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(pacer.dispatched(), 2);
    }

    #[tokio::test]
    async fn test_zero_delay_never_sleeps() {
        let mut pacer = Pacer::new(Duration::ZERO);
        for _ in 0..5 {
            pacer.wait().await;
        }
        assert_eq!(pacer.dispatched(), 5);
    }
}
