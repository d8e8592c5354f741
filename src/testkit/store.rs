//! Store wrapper with switchable write failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapter::outbound::memory::MemoryWatchStore;
use crate::domain::{PriceSample, ReservationCode, ReservationRecord, Watch, WatchId, WatchPatch};
use crate::error::StorageError;
use crate::port::outbound::store::{CheckClaim, WatchStore};

/// [`MemoryWatchStore`] whose reservation writes can be made to fail.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    inner: Arc<MemoryWatchStore>,
    reservation_writes_fail: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryWatchStore>) -> Self {
        Self {
            inner,
            reservation_writes_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every later `insert_reservation` fail as unreachable.
    pub fn fail_reservation_writes(&self) {
        self.reservation_writes_fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl WatchStore for FlakyStore {
    async fn list_active_watches(&self) -> Result<Vec<Watch>, StorageError> {
        self.inner.list_active_watches().await
    }

    async fn get_watch(&self, id: &WatchId) -> Result<Option<Watch>, StorageError> {
        self.inner.get_watch(id).await
    }

    async fn insert_watch(&self, watch: &Watch) -> Result<(), StorageError> {
        self.inner.insert_watch(watch).await
    }

    async fn update_watch(&self, id: &WatchId, patch: &WatchPatch) -> Result<(), StorageError> {
        self.inner.update_watch(id, patch).await
    }

    async fn delete_watch(&self, id: &WatchId) -> Result<(), StorageError> {
        self.inner.delete_watch(id).await
    }

    async fn claim_check(
        &self,
        id: &WatchId,
        claim: &CheckClaim,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.inner.claim_check(id, claim, stale_before).await
    }

    async fn release_check(&self, id: &WatchId, claim: &CheckClaim) -> Result<(), StorageError> {
        self.inner.release_check(id, claim).await
    }

    async fn append_price_sample(&self, sample: &PriceSample) -> Result<(), StorageError> {
        self.inner.append_price_sample(sample).await
    }

    async fn price_samples(&self, id: &WatchId) -> Result<Vec<PriceSample>, StorageError> {
        self.inner.price_samples(id).await
    }

    async fn insert_reservation(&self, record: &ReservationRecord) -> Result<(), StorageError> {
        if self.reservation_writes_fail.load(Ordering::SeqCst) {
            return Err(StorageError::Unreachable("database is locked".to_string()));
        }
        self.inner.insert_reservation(record).await
    }

    async fn get_reservation(
        &self,
        code: &ReservationCode,
    ) -> Result<Option<ReservationRecord>, StorageError> {
        self.inner.get_reservation(code).await
    }

    async fn supersede_reservation(
        &self,
        code: &ReservationCode,
        by: &ReservationCode,
    ) -> Result<(), StorageError> {
        self.inner.supersede_reservation(code, by).await
    }
}
