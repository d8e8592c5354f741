//! Persistence port for watches, price history and reservations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PriceSample, ReservationCode, ReservationRecord, Watch, WatchId, WatchPatch};
use crate::error::StorageError;

/// Durable claim on the check slot of one watch.
///
/// Lives in the store, so it excludes cycles in every process sharing it.
/// A claim older than the caller's staleness cutoff may be taken over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckClaim {
    pub token: String,
    pub claimed_at: DateTime<Utc>,
}

impl CheckClaim {
    /// Fresh claim with a unique token.
    #[must_use]
    pub fn new(claimed_at: DateTime<Utc>) -> Self {
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            claimed_at,
        }
    }
}

/// Record store backing the watch engine.
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// All watches with `active = true`.
    async fn list_active_watches(&self) -> Result<Vec<Watch>, StorageError>;

    /// Fetch one watch regardless of its active flag.
    async fn get_watch(&self, id: &WatchId) -> Result<Option<Watch>, StorageError>;

    /// Insert a new watch. `Conflict` if the id exists.
    async fn insert_watch(&self, watch: &Watch) -> Result<(), StorageError>;

    /// Apply a partial update. `NotFound` if the watch is gone.
    async fn update_watch(&self, id: &WatchId, patch: &WatchPatch) -> Result<(), StorageError>;

    /// Delete a watch. `NotFound` if the watch is gone.
    async fn delete_watch(&self, id: &WatchId) -> Result<(), StorageError>;

    /// Take the check slot of a watch.
    ///
    /// `Ok(false)` while another claim newer than `stale_before` holds it.
    /// `NotFound` if the watch is gone.
    async fn claim_check(
        &self,
        id: &WatchId,
        claim: &CheckClaim,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Give the check slot back if `claim` still holds it.
    ///
    /// `NotFound` if the watch is gone.
    async fn release_check(&self, id: &WatchId, claim: &CheckClaim) -> Result<(), StorageError>;

    /// Append a price observation.
    async fn append_price_sample(&self, sample: &PriceSample) -> Result<(), StorageError>;

    /// Price history of a watch, oldest first.
    async fn price_samples(&self, id: &WatchId) -> Result<Vec<PriceSample>, StorageError>;

    /// Persist a reservation. `Conflict` if the code exists.
    async fn insert_reservation(&self, record: &ReservationRecord) -> Result<(), StorageError>;

    /// Fetch a reservation by code.
    async fn get_reservation(
        &self,
        code: &ReservationCode,
    ) -> Result<Option<ReservationRecord>, StorageError>;

    /// Mark `code` as replaced by `by`. `NotFound` if `code` is unknown.
    async fn supersede_reservation(
        &self,
        code: &ReservationCode,
        by: &ReservationCode,
    ) -> Result<(), StorageError>;
}
