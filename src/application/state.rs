//! In-flight cycle tracking.
//!
//! At most one check (and therefore at most one hold attempt) may run per
//! watch. Manual and automatic triggers share this guard.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{Trigger, WatchId};

/// Watches with an in-flight cycle in this process.
///
/// Other processes sharing the store are kept out by the store's check
/// lease, which every cycle claims before it fetches.
#[derive(Debug, Clone, Default)]
pub struct CycleGuard {
    in_flight: Arc<DashMap<WatchId, Trigger>>,
}

impl CycleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the watch for one cycle.
    ///
    /// Returns `None` when a cycle is already running; the caller must drop
    /// the trigger. The claim is released when the lease is dropped.
    #[must_use]
    pub fn try_acquire(&self, id: &WatchId, trigger: Trigger) -> Option<CycleLease> {
        use dashmap::mapref::entry::Entry;

        match self.in_flight.entry(id.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(trigger);
                Some(CycleLease {
                    id: id.clone(),
                    trigger,
                    guard: self.clone(),
                })
            }
        }
    }

    /// Whether a cycle is running for `id`.
    #[must_use]
    pub fn is_running(&self, id: &WatchId) -> bool {
        self.in_flight.contains_key(id)
    }
}

/// Exclusive claim on a watch for the duration of one cycle.
#[derive(Debug)]
pub struct CycleLease {
    id: WatchId,
    trigger: Trigger,
    guard: CycleGuard,
}

impl CycleLease {
    #[must_use]
    pub fn watch_id(&self) -> &WatchId {
        &self.id
    }

    #[must_use]
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

impl Drop for CycleLease {
    fn drop(&mut self) {
        self.guard.in_flight.remove(&self.id);
    }
}
