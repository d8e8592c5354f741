//! Append-only price observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::WatchId;

/// One observed price for a watch, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub watch_id: WatchId,
    pub observed_at: DateTime<Utc>,
    pub price: i64,
    /// Whether this observation became the watch's `current_price`.
    pub persisted: bool,
}
