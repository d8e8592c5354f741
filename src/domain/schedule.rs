//! Due-selection rule for watches.
//!
//! A watch is due when it is active and either has never been checked or
//! its interval has fully elapsed since the last check.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::watch::Watch;

/// What started a check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The watch's interval elapsed.
    Automatic,
    /// A user asked for an immediate check.
    Manual,
}

impl Trigger {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instant at which the watch next becomes due; it is due at any `now` at
/// or past this instant.
///
/// `None` for inactive watches. Never-checked watches are due at `now`.
#[must_use]
pub fn next_due_at(watch: &Watch, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !watch.active {
        return None;
    }
    Some(match watch.last_checked_at {
        None => now,
        Some(last) => last + interval(watch),
    })
}

/// Fraction of the interval elapsed since the last check, capped at 1.0.
#[must_use]
pub fn progress(watch: &Watch, now: DateTime<Utc>) -> f64 {
    let Some(last) = watch.last_checked_at else {
        return 1.0;
    };
    let interval_ms = interval(watch).num_milliseconds();
    if interval_ms <= 0 {
        return 1.0;
    }
    let elapsed_ms = (now - last).num_milliseconds().max(0);
    (elapsed_ms as f64 / interval_ms as f64).min(1.0)
}

/// Intervals are clamped so date arithmetic cannot overflow.
const MAX_INTERVAL_SECS: u64 = 10 * 365 * 24 * 3600;

fn interval(watch: &Watch) -> Duration {
    let secs = watch.check_interval_secs.min(MAX_INTERVAL_SECS);
    Duration::seconds(secs as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::itinerary::{Itinerary, Leg, Provider};
    use chrono::NaiveDate;

    fn is_due(watch: &Watch, now: DateTime<Utc>) -> bool {
        next_due_at(watch, now).is_some_and(|at| at <= now)
    }

    fn watch(interval: u64) -> Watch {
        Watch::new(
            "owner",
            Itinerary::one_way(
                Provider::Alpha,
                Leg::new("HAN", "SGN", NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()),
            ),
            interval,
        )
    }

    #[test]
    fn never_checked_watch_is_due() {
        let now = Utc::now();
        let w = watch(600);
        assert!(is_due(&w, now));
        assert_eq!(next_due_at(&w, now), Some(now));
        assert_eq!(progress(&w, now), 1.0);
    }

    #[test]
    fn inactive_watch_is_never_due() {
        let now = Utc::now();
        let mut w = watch(600);
        w.active = false;
        assert!(!is_due(&w, now));
        assert!(next_due_at(&w, now).is_none());
    }

    #[test]
    fn due_exactly_when_interval_elapses() {
        let now = Utc::now();
        let mut w = watch(600);
        w.last_checked_at = Some(now - Duration::seconds(599));
        assert!(!is_due(&w, now));

        w.last_checked_at = Some(now - Duration::seconds(600));
        assert!(is_due(&w, now));
        assert_eq!(next_due_at(&w, now), Some(now));
    }

    #[test]
    fn progress_is_fraction_of_interval() {
        let now = Utc::now();
        let mut w = watch(600);
        w.last_checked_at = Some(now - Duration::seconds(150));
        assert!((progress(&w, now) - 0.25).abs() < 1e-9);

        w.last_checked_at = Some(now - Duration::seconds(6000));
        assert_eq!(progress(&w, now), 1.0);
    }

    #[test]
    fn progress_ignores_clock_skew() {
        let now = Utc::now();
        let mut w = watch(600);
        w.last_checked_at = Some(now + Duration::seconds(30));
        assert_eq!(progress(&w, now), 0.0);
        assert!(!is_due(&w, now));
    }
}
