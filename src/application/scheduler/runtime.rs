//! Coordinating scheduler loop.
//!
//! One task owns the timer registry. Due watches are checked on a
//! [`JoinSet`] so a slow provider call for one watch never delays another.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::registry::TimerRegistry;
use crate::application::cycle::{CheckCycle, CycleReport};
use crate::application::state::CycleGuard;
use crate::domain::schedule;
use crate::domain::{Trigger, Watch, WatchId};
use crate::error::{Error, Result};
use crate::port::inbound::scheduler::{SchedulerControl, TriggerOutcome, WatchProgress};
use crate::port::outbound::clock::Clock;
use crate::port::outbound::store::WatchStore;

const COMMAND_BUFFER: usize = 64;

/// Timing knobs for the scheduler loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    /// How often the registry is re-synced from the store.
    pub refresh_interval: Duration,
    /// Longest sleep when nothing is due.
    pub idle_sleep: Duration,
    /// How long shutdown waits for in-flight cycles.
    pub shutdown_grace: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            idle_sleep: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

enum Command {
    Arm(Watch),
    Disarm(WatchId),
    Trigger(WatchId, oneshot::Sender<TriggerOutcome>),
    Snapshot(oneshot::Sender<Vec<WatchProgress>>),
}

/// Cloneable handle to a running [`Scheduler`].
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SchedulerStopped)
    }
}

#[async_trait]
impl SchedulerControl for SchedulerHandle {
    async fn arm(&self, watch: Watch) -> Result<()> {
        self.send(Command::Arm(watch)).await
    }

    async fn disarm(&self, id: WatchId) -> Result<()> {
        self.send(Command::Disarm(id)).await
    }

    async fn trigger(&self, id: WatchId) -> Result<TriggerOutcome> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Trigger(id, tx)).await?;
        rx.await.map_err(|_| Error::SchedulerStopped)
    }

    async fn snapshot(&self) -> Result<Vec<WatchProgress>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| Error::SchedulerStopped)
    }
}

/// Owns the per-watch timers and dispatches check cycles.
pub struct Scheduler {
    cycle: Arc<CheckCycle>,
    store: Arc<dyn WatchStore>,
    clock: Arc<dyn Clock>,
    guard: CycleGuard,
    settings: SchedulerSettings,
    registry: TimerRegistry,
    commands: mpsc::Receiver<Command>,
    in_flight: JoinSet<(WatchId, CycleReport)>,
}

impl Scheduler {
    /// Create a scheduler and the handle used to control it.
    pub fn new(
        cycle: Arc<CheckCycle>,
        store: Arc<dyn WatchStore>,
        clock: Arc<dyn Clock>,
        guard: CycleGuard,
        settings: SchedulerSettings,
    ) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let scheduler = Self {
            cycle,
            store,
            clock,
            guard,
            settings,
            registry: TimerRegistry::new(),
            commands: rx,
            in_flight: JoinSet::new(),
        };
        (scheduler, SchedulerHandle { commands: tx })
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    ///
    /// Fails only if the initial load of active watches fails.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let watches = self.store.list_active_watches().await?;
        let now = self.clock.now();
        for watch in watches {
            self.registry.arm(watch, now);
        }
        info!(watches = self.registry.len(), "Scheduler started");

        let mut refresh = tokio::time::interval(self.settings.refresh_interval);
        refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        refresh.tick().await;

        loop {
            self.dispatch_due();
            let sleep = self.sleep_duration();

            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                Some(command) = self.commands.recv() => {
                    self.handle(command);
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.complete(joined);
                }
                _ = refresh.tick() => {
                    self.resync().await;
                }
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        self.drain().await;
        info!("Scheduler stopped");
        Ok(())
    }

    fn sleep_duration(&self) -> Duration {
        let Some(deadline) = self.registry.next_deadline() else {
            return self.settings.idle_sleep;
        };
        let until = (deadline - self.clock.now()).to_std().unwrap_or_default();
        until.min(self.settings.idle_sleep)
    }

    fn dispatch_due(&mut self) {
        let now = self.clock.now();
        for id in self.registry.due(now) {
            if self.dispatch(&id, Trigger::Automatic) == TriggerOutcome::AlreadyRunning {
                self.registry.postpone(&id, now);
            }
        }
    }

    fn dispatch(&mut self, id: &WatchId, trigger: Trigger) -> TriggerOutcome {
        let Some(watch) = self.registry.watch(id).cloned() else {
            return TriggerOutcome::UnknownWatch;
        };
        let Some(lease) = self.guard.try_acquire(id, trigger) else {
            debug!(watch_id = %id, %trigger, "Check already in flight, dropping trigger");
            return TriggerOutcome::AlreadyRunning;
        };

        self.registry.park(id);
        let cycle = Arc::clone(&self.cycle);
        let id = id.clone();
        self.in_flight.spawn(async move {
            let report = cycle.run(lease, watch).await;
            (id, report)
        });
        TriggerOutcome::Dispatched
    }

    fn handle(&mut self, command: Command) {
        let now = self.clock.now();
        match command {
            Command::Arm(watch) => {
                let id = watch.id.clone();
                let armed = self.registry.arm(watch, now);
                debug!(watch_id = %id, armed, "Arm requested");
            }
            Command::Disarm(id) => {
                let removed = self.registry.disarm(&id).is_some();
                debug!(watch_id = %id, removed, "Disarm requested");
            }
            Command::Trigger(id, reply) => {
                let outcome = self.dispatch(&id, Trigger::Manual);
                debug!(watch_id = %id, outcome = outcome.as_str(), "Manual trigger");
                let _ = reply.send(outcome);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn complete(&mut self, joined: std::result::Result<(WatchId, CycleReport), JoinError>) {
        let now = self.clock.now();
        match joined {
            Ok((id, report)) => match report.rearmable() {
                Some(watch) if self.registry.contains(&id) => {
                    self.registry.arm(watch.clone(), now);
                    if report.deferred() {
                        debug!(watch_id = %id, outcome = report.outcome.label(), "Check deferred");
                        self.registry.postpone(&id, now);
                    }
                }
                Some(_) => {
                    debug!(watch_id = %id, "Watch disarmed during check, not re-arming");
                }
                None => {
                    if self.registry.disarm(&id).is_some() {
                        info!(watch_id = %id, "Watch retired");
                    }
                }
            },
            Err(e) => {
                error!(error = %e, "Check task failed");
                let guard = &self.guard;
                let rearmed = self.registry.unpark_idle(now, |id| guard.is_running(id));
                warn!(rearmed, "Re-armed watches orphaned by a failed check");
            }
        }
    }

    /// Pick up watches created, updated or removed outside the scheduler.
    async fn resync(&mut self) {
        let watches = match self.store.list_active_watches().await {
            Ok(watches) => watches,
            Err(e) => {
                warn!(error = %e, "Failed to refresh watches from store");
                return;
            }
        };

        let now = self.clock.now();
        let active: std::collections::HashSet<WatchId> =
            watches.iter().map(|w| w.id.clone()).collect();

        for id in self.registry.idle_ids() {
            if !active.contains(&id) {
                self.registry.disarm(&id);
                debug!(watch_id = %id, "Watch no longer active, disarmed");
            }
        }
        for watch in watches {
            // Unchanged watches keep their deadline, including a postponement.
            let unchanged = self.registry.watch(&watch.id) == Some(&watch);
            if !unchanged && !self.registry.is_parked(&watch.id) {
                self.registry.arm(watch, now);
            }
        }
        debug!(watches = self.registry.len(), "Registry re-synced");
    }

    fn snapshot(&self) -> Vec<WatchProgress> {
        let now = self.clock.now();
        self.registry
            .watches()
            .into_iter()
            .map(|watch| WatchProgress {
                watch_id: watch.id.clone(),
                itinerary: watch.itinerary.to_string(),
                current_price: watch.current_price,
                last_checked_at: watch.last_checked_at,
                progress: schedule::progress(watch, now),
                checking: self.guard.is_running(&watch.id),
            })
            .collect()
    }

    /// Wait for in-flight cycles, up to the grace period.
    async fn drain(&mut self) {
        if self.in_flight.is_empty() {
            return;
        }
        info!(in_flight = self.in_flight.len(), "Waiting for in-flight checks");

        let grace = self.settings.shutdown_grace;
        let finished = tokio::time::timeout(grace, async {
            while let Some(joined) = self.in_flight.join_next().await {
                self.complete(joined);
            }
        })
        .await;

        if finished.is_err() {
            warn!(
                remaining = self.in_flight.len(),
                "Grace period elapsed, aborting in-flight checks"
            );
            self.in_flight.abort_all();
        }
    }
}
