//! In-memory watch store.
//!
//! Same semantics as the SQLite store; used by tests and throwaway runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{PriceSample, ReservationCode, ReservationRecord, Watch, WatchId, WatchPatch};
use crate::error::StorageError;
use crate::port::outbound::store::{CheckClaim, WatchStore};

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryWatchStore {
    watches: RwLock<HashMap<WatchId, Watch>>,
    samples: RwLock<Vec<PriceSample>>,
    reservations: RwLock<HashMap<ReservationCode, ReservationRecord>>,
    leases: RwLock<HashMap<WatchId, CheckClaim>>,
}

impl MemoryWatchStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `watches`.
    #[must_use]
    pub fn with_watches(watches: impl IntoIterator<Item = Watch>) -> Self {
        let store = Self::new();
        {
            let mut map = store.watches.write();
            for watch in watches {
                map.insert(watch.id.clone(), watch);
            }
        }
        store
    }

    /// All reservations, oldest first.
    #[must_use]
    pub fn reservations(&self) -> Vec<ReservationRecord> {
        let mut records: Vec<_> = self.reservations.read().values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl WatchStore for MemoryWatchStore {
    async fn list_active_watches(&self) -> Result<Vec<Watch>, StorageError> {
        let mut active: Vec<_> = self
            .watches
            .read()
            .values()
            .filter(|w| w.active)
            .cloned()
            .collect();
        active.sort_by_key(|w| w.created_at);
        Ok(active)
    }

    async fn get_watch(&self, id: &WatchId) -> Result<Option<Watch>, StorageError> {
        Ok(self.watches.read().get(id).cloned())
    }

    async fn insert_watch(&self, watch: &Watch) -> Result<(), StorageError> {
        let mut watches = self.watches.write();
        if watches.contains_key(&watch.id) {
            return Err(StorageError::Conflict);
        }
        watches.insert(watch.id.clone(), watch.clone());
        Ok(())
    }

    async fn update_watch(&self, id: &WatchId, patch: &WatchPatch) -> Result<(), StorageError> {
        let mut watches = self.watches.write();
        let watch = watches.get_mut(id).ok_or(StorageError::NotFound)?;
        watch.apply(patch);
        Ok(())
    }

    async fn delete_watch(&self, id: &WatchId) -> Result<(), StorageError> {
        self.leases.write().remove(id);
        self.watches
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn claim_check(
        &self,
        id: &WatchId,
        claim: &CheckClaim,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        if !self.watches.read().contains_key(id) {
            return Err(StorageError::NotFound);
        }
        let mut leases = self.leases.write();
        if leases
            .get(id)
            .is_some_and(|held| held.claimed_at >= stale_before)
        {
            return Ok(false);
        }
        leases.insert(id.clone(), claim.clone());
        Ok(true)
    }

    async fn release_check(&self, id: &WatchId, claim: &CheckClaim) -> Result<(), StorageError> {
        if !self.watches.read().contains_key(id) {
            return Err(StorageError::NotFound);
        }
        let mut leases = self.leases.write();
        if leases.get(id).is_some_and(|held| held.token == claim.token) {
            leases.remove(id);
        }
        Ok(())
    }

    async fn append_price_sample(&self, sample: &PriceSample) -> Result<(), StorageError> {
        self.samples.write().push(sample.clone());
        Ok(())
    }

    async fn price_samples(&self, id: &WatchId) -> Result<Vec<PriceSample>, StorageError> {
        Ok(self
            .samples
            .read()
            .iter()
            .filter(|s| &s.watch_id == id)
            .cloned()
            .collect())
    }

    async fn insert_reservation(&self, record: &ReservationRecord) -> Result<(), StorageError> {
        let mut reservations = self.reservations.write();
        if reservations.contains_key(&record.code) {
            return Err(StorageError::Conflict);
        }
        reservations.insert(record.code.clone(), record.clone());
        Ok(())
    }

    async fn get_reservation(
        &self,
        code: &ReservationCode,
    ) -> Result<Option<ReservationRecord>, StorageError> {
        Ok(self.reservations.read().get(code).cloned())
    }

    async fn supersede_reservation(
        &self,
        code: &ReservationCode,
        by: &ReservationCode,
    ) -> Result<(), StorageError> {
        let mut reservations = self.reservations.write();
        let record = reservations.get_mut(code).ok_or(StorageError::NotFound)?;
        record.superseded_by = Some(by.clone());
        Ok(())
    }
}
