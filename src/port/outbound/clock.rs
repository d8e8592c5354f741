//! Time source for the engine.

use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

/// Source of "now" for due-selection and `last_checked_at` stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock anchored once, then advanced by the tokio monotonic clock.
///
/// Stamps never go backwards when the system clock is adjusted, and follow
/// paused/advanced tokio time in tests.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    anchor_utc: DateTime<Utc>,
    anchor: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Clock whose current reading is `at`.
    #[must_use]
    pub fn anchored_at(at: DateTime<Utc>) -> Self {
        Self {
            anchor_utc: at,
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.anchor.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.anchor_utc + elapsed
    }
}
