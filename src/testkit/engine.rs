//! Pre-wired engine over in-memory fakes.
//!
//! [`Harness`] builds a [`CheckCycle`] and [`Scheduler`] against a
//! [`MemoryWatchStore`] (behind a [`FlakyStore`]), a [`ScriptedFetcher`], [`ScriptedReservations`] and
//! a [`RecordingNotifier`], with a clock that follows tokio time.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use super::notifier::RecordingNotifier;
use super::provider::{ScriptedFetcher, ScriptedReservations};
use super::store::FlakyStore;
use crate::adapter::outbound::memory::MemoryWatchStore;
use crate::application::cycle::{CheckCycle, CycleReport, CycleSettings};
use crate::application::hold::AutoHoldOrchestrator;
use crate::application::scheduler::{Scheduler, SchedulerHandle, SchedulerSettings};
use crate::application::state::CycleGuard;
use crate::domain::{Trigger, Watch};
use crate::port::outbound::clock::{Clock, MonotonicClock};
use crate::port::outbound::notifier::NotifierRegistry;

/// Wall-clock reading at which harness clocks start.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Fakes plus the engine wired over them.
pub struct Harness {
    pub store: Arc<MemoryWatchStore>,
    /// The engine's view of `store`; faults set here only affect the engine.
    pub faults: FlakyStore,
    pub fetcher: ScriptedFetcher,
    pub reservations: ScriptedReservations,
    pub notifier: RecordingNotifier,
    pub clock: Arc<MonotonicClock>,
    pub guard: CycleGuard,
    pub cycle: Arc<CheckCycle>,
}

impl Harness {
    /// Harness over `watches` with default cycle settings.
    pub fn new(watches: impl IntoIterator<Item = Watch>) -> Self {
        Self::with_settings(watches, CycleSettings::default(), ScriptedFetcher::new())
    }

    /// Harness with explicit cycle settings and fetcher.
    pub fn with_settings(
        watches: impl IntoIterator<Item = Watch>,
        settings: CycleSettings,
        fetcher: ScriptedFetcher,
    ) -> Self {
        let store = Arc::new(MemoryWatchStore::with_watches(watches));
        let faults = FlakyStore::new(Arc::clone(&store));
        let reservations = ScriptedReservations::new();
        let notifier = RecordingNotifier::new();
        let clock = Arc::new(MonotonicClock::anchored_at(epoch()));

        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(notifier.clone()));
        let notifiers = Arc::new(registry);

        let hold = AutoHoldOrchestrator::new(
            Arc::new(reservations.clone()),
            Arc::new(faults.clone()),
            Arc::clone(&notifiers),
            clock.clone(),
        );
        let cycle = Arc::new(CheckCycle::new(
            Arc::new(fetcher.clone()),
            Arc::new(faults.clone()),
            notifiers,
            clock.clone(),
            hold,
            settings,
        ));

        Self {
            store,
            faults,
            fetcher,
            reservations,
            notifier,
            clock,
            guard: CycleGuard::new(),
            cycle,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run one cycle for `watch` under a fresh lease.
    ///
    /// Returns `None` when a cycle for the watch is already in flight.
    pub async fn run_cycle(&self, watch: Watch, trigger: Trigger) -> Option<CycleReport> {
        let lease = self.guard.try_acquire(&watch.id, trigger)?;
        Some(self.cycle.run(lease, watch).await)
    }

    /// Build a scheduler sharing this harness's store, guard and clock.
    pub fn scheduler(&self, settings: SchedulerSettings) -> (Scheduler, SchedulerHandle) {
        Scheduler::new(
            Arc::clone(&self.cycle),
            Arc::new(self.faults.clone()),
            self.clock.clone(),
            self.guard.clone(),
            settings,
        )
    }
}
