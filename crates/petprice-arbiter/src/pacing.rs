//! Randomized delay between successive scrape items.

use std::time::Duration;

use rand::Rng;

/// Waits a uniformly random time in `[min, max]` between items, spreading
/// requests so retail sites do not rate-limit the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    /// Bounds are reordered if given backwards.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// A pacer that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let ms = if self.min_ms == self.max_ms {
            self.min_ms
        } else {
            rand::rng().random_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        tracing::debug!(delay = ?delay, "pacing before next item");
        tokio::time::sleep(delay).await;
    }
}
