//! Watch management projection types for operator-facing adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// One row of the watch list.
#[derive(Debug, Clone)]
pub struct WatchSummary {
    pub id: String,
    pub provider: String,
    /// Human-readable itinerary.
    pub itinerary: String,
    pub current_price: Option<i64>,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Fraction of the check interval elapsed, in `[0, 1]`.
    pub progress: f64,
    pub auto_hold: bool,
}

/// Result of a manual check.
#[derive(Debug, Clone)]
pub struct CheckSummary {
    pub watch_id: String,
    /// Stable outcome label, e.g. `decreased` or `check_failed`.
    pub outcome: String,
    /// Failure or hold detail, when there is one.
    pub detail: Option<String>,
    /// Stored price after the check.
    pub current_price: Option<i64>,
    /// The watch was deleted by the check (hold placed or already issued).
    pub retired: bool,
}

/// Watch management use-cases for operator-facing adapters.
#[async_trait]
pub trait WatchOperator: Send + Sync {
    /// Active watches, oldest first.
    async fn list_watches(&self, config_toml: &str) -> Result<Vec<WatchSummary>>;

    /// Run one manual check cycle for `watch_id`.
    async fn check_watch(&self, config_toml: &str, watch_id: &str) -> Result<CheckSummary>;

    /// Validate and insert a watch described as JSON; returns its id.
    async fn add_watch(&self, config_toml: &str, watch_json: &str) -> Result<String>;

    /// Delete a watch.
    async fn remove_watch(&self, config_toml: &str, watch_id: &str) -> Result<()>;
}
