//! Scheduler control port.
//!
//! Lets driving adapters (CLI, chat commands, the store re-sync) reach the
//! timer registry without knowing how the scheduler loop is built.
//!
//! - [`SchedulerControl`]: arm/disarm/trigger commands and a progress view
//! - [`TriggerOutcome`]: what happened to a manual trigger
//! - [`WatchProgress`]: per-watch row for status displays

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Watch, WatchId};
use crate::error::Result;

/// Result of a manual trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A cycle was started for the watch.
    Dispatched,
    /// A cycle for the watch is already in flight; the trigger was dropped.
    AlreadyRunning,
    /// The watch is not armed (unknown, inactive or deleted).
    UnknownWatch,
}

impl TriggerOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dispatched => "dispatched",
            Self::AlreadyRunning => "already_running",
            Self::UnknownWatch => "unknown_watch",
        }
    }
}

/// Progress row for one armed watch.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchProgress {
    pub watch_id: WatchId,
    /// Human-readable itinerary summary.
    pub itinerary: String,
    pub current_price: Option<i64>,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Fraction of the interval elapsed, in `0.0..=1.0`.
    pub progress: f64,
    /// A cycle is in flight right now.
    pub checking: bool,
}

/// Commands accepted by a running scheduler.
#[async_trait]
pub trait SchedulerControl: Send + Sync {
    /// Register or refresh the timer for `watch`.
    ///
    /// Inactive watches are disarmed instead.
    async fn arm(&self, watch: Watch) -> Result<()>;

    /// Remove the timer for a watch. In-flight cycles are not cancelled.
    async fn disarm(&self, id: WatchId) -> Result<()>;

    /// Run a manual check now, subject to the in-flight guard.
    async fn trigger(&self, id: WatchId) -> Result<TriggerOutcome>;

    /// Progress of every armed watch, ordered by id.
    async fn snapshot(&self) -> Result<Vec<WatchProgress>>;
}
