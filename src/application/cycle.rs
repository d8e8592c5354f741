//! One check → compare → act cycle for a single watch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::hold::{AutoHoldOrchestrator, HoldOutcome};
use super::state::CycleLease;
use crate::domain::policy::{self, Classification};
use crate::domain::{PriceQuote, PriceSample, Trigger, Watch, WatchId, WatchPatch};
use crate::error::StorageError;
use crate::port::outbound::clock::Clock;
use crate::port::outbound::fetch::PriceFetcher;
use crate::port::outbound::notifier::{
    Event, FailureEvent, NotifierRegistry, PriceEvent, WatchSubject,
};
use crate::port::outbound::store::{CheckClaim, WatchStore};

/// Why a cycle stopped before fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Another process holds the store's check lease for the watch.
    InFlightElsewhere,
    /// The watch was deleted or deactivated before the check began.
    Retired,
    /// The store could not be reached to claim the lease or reload the watch.
    StoreUnavailable(String),
}

/// What a cycle concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was fetched and nobody was told.
    Skipped(SkipReason),
    /// The fetch failed or nothing matched the watch; no comparison took place.
    CheckFailed { reason: String },
    /// A matched quote was compared with the stored price.
    Priced {
        classification: Classification,
        /// The quote became the watch's `current_price`.
        persisted: bool,
        /// Present when the drop qualified for auto-hold.
        hold: Option<HoldOutcome>,
    },
}

impl CycleOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(SkipReason::InFlightElsewhere) => "already_running",
            Self::Skipped(SkipReason::Retired) => "retired",
            Self::Skipped(SkipReason::StoreUnavailable(_)) => "store_unavailable",
            Self::CheckFailed { .. } => "check_failed",
            Self::Priced { classification, .. } => classification.as_str(),
        }
    }
}

/// Summary handed back to the scheduler when a cycle completes.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub trigger: Trigger,
    pub checked_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
    /// Stored watch after the cycle; `None` once it was deleted.
    pub watch: Option<Watch>,
}

impl CycleReport {
    /// The watch still exists and is active, so its timer may be re-armed.
    #[must_use]
    pub fn rearmable(&self) -> Option<&Watch> {
        self.watch.as_ref().filter(|w| w.active)
    }

    /// The cycle gave way without checking and should be retried later.
    #[must_use]
    pub fn deferred(&self) -> bool {
        matches!(
            self.outcome,
            CycleOutcome::Skipped(SkipReason::InFlightElsewhere | SkipReason::StoreUnavailable(_))
        )
    }
}

/// Settings that shape which outcomes reach the user.
#[derive(Debug, Clone, Copy)]
pub struct CycleSettings {
    /// Report `checkFailed` for automatic triggers too.
    pub notify_automatic_failures: bool,
    /// Age after which an unreleased check lease may be taken over.
    pub check_lease: chrono::Duration,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            notify_automatic_failures: true,
            check_lease: chrono::Duration::minutes(10),
        }
    }
}

/// Whether a cycle may go ahead after claiming the store lease.
enum Admission {
    /// Lease held; carries the freshly stored watch.
    Proceed(Watch),
    /// Stop here; carries the last known watch, `None` once deleted.
    Skip(SkipReason, Option<Watch>),
}

/// Drives the check cycle of a watch.
pub struct CheckCycle {
    fetcher: Arc<dyn PriceFetcher>,
    store: Arc<dyn WatchStore>,
    notifiers: Arc<NotifierRegistry>,
    clock: Arc<dyn Clock>,
    hold: AutoHoldOrchestrator,
    settings: CycleSettings,
}

impl CheckCycle {
    pub fn new(
        fetcher: Arc<dyn PriceFetcher>,
        store: Arc<dyn WatchStore>,
        notifiers: Arc<NotifierRegistry>,
        clock: Arc<dyn Clock>,
        hold: AutoHoldOrchestrator,
        settings: CycleSettings,
    ) -> Self {
        Self {
            fetcher,
            store,
            notifiers,
            clock,
            hold,
            settings,
        }
    }

    /// Run one cycle. The lease keeps every other trigger in this process
    /// out until this returns; the store's check lease does the same for
    /// other processes sharing the database.
    pub async fn run(&self, lease: CycleLease, watch: Watch) -> CycleReport {
        debug_assert_eq!(lease.watch_id(), &watch.id);
        let trigger = lease.trigger();
        let claim = CheckClaim::new(self.clock.now());

        let (outcome, watch, checked_at) = match self.claim(&claim, watch).await {
            Admission::Proceed(watch) => {
                debug!(watch_id = %watch.id, %trigger, "Check started");
                let checked = self.check(watch, trigger).await;
                self.release(lease.watch_id(), &claim).await;
                checked
            }
            Admission::Skip(reason, watch) => {
                (CycleOutcome::Skipped(reason), watch, self.clock.now())
            }
        };

        info!(
            watch_id = %lease.watch_id(),
            %trigger,
            outcome = outcome.label(),
            retired = watch.is_none(),
            "Check completed"
        );

        CycleReport {
            trigger,
            checked_at,
            outcome,
            watch,
        }
    }

    /// Claim the store's check lease and reload the watch under it.
    async fn claim(&self, claim: &CheckClaim, watch: Watch) -> Admission {
        let stale_before = claim.claimed_at - self.settings.check_lease;

        match self.store.claim_check(&watch.id, claim, stale_before).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(watch_id = %watch.id, "Check lease held by another process");
                return Admission::Skip(SkipReason::InFlightElsewhere, Some(watch));
            }
            Err(StorageError::NotFound) => return Admission::Skip(SkipReason::Retired, None),
            Err(e) => {
                warn!(watch_id = %watch.id, error = %e, "Failed to claim check lease");
                return Admission::Skip(SkipReason::StoreUnavailable(e.to_string()), Some(watch));
            }
        }

        match self.store.get_watch(&watch.id).await {
            Ok(Some(stored)) if stored.active => Admission::Proceed(stored),
            Ok(Some(stored)) => {
                debug!(watch_id = %stored.id, "Watch deactivated before check");
                self.release(&stored.id, claim).await;
                Admission::Skip(SkipReason::Retired, Some(stored))
            }
            Ok(None) => Admission::Skip(SkipReason::Retired, None),
            Err(e) => {
                warn!(watch_id = %watch.id, error = %e, "Failed to reload watch before check");
                self.release(&watch.id, claim).await;
                Admission::Skip(SkipReason::StoreUnavailable(e.to_string()), Some(watch))
            }
        }
    }

    /// Fetch, compare and write back.
    async fn check(
        &self,
        watch: Watch,
        trigger: Trigger,
    ) -> (CycleOutcome, Option<Watch>, DateTime<Utc>) {
        let (outcome, patch) = match self.fetcher.check_price(&watch).await {
            Err(e) => (self.check_failed(&watch, e.to_string(), trigger), None),
            Ok(quote) if !quote.matched => {
                let reason = format!(
                    "no itinerary matches the requested fare class (cheapest {})",
                    quote.price
                );
                (self.check_failed(&watch, reason, trigger), None)
            }
            Ok(quote) => self.compare(&watch, &quote, trigger).await,
        };

        let checked_at = self.clock.now();
        let watch = match &outcome {
            CycleOutcome::Priced {
                hold: Some(hold), ..
            } if hold.retires_watch() => None,
            _ => {
                let mut patch = patch.unwrap_or_default();
                patch.last_checked_at = Some(checked_at);
                self.finish(watch, &patch).await
            }
        };
        (outcome, watch, checked_at)
    }

    /// A watch deleted under the lease takes the lease with it.
    async fn release(&self, id: &WatchId, claim: &CheckClaim) {
        match self.store.release_check(id, claim).await {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(e) => {
                warn!(watch_id = %id, error = %e, "Failed to release check lease");
            }
        }
    }

    /// Compare a matched quote and act on it.
    ///
    /// Returns the price fields to write back, if any.
    async fn compare(
        &self,
        watch: &Watch,
        quote: &PriceQuote,
        trigger: Trigger,
    ) -> (CycleOutcome, Option<WatchPatch>) {
        let Some(decision) = policy::evaluate(watch, quote) else {
            return (
                self.check_failed(watch, "quote did not match".into(), trigger),
                None,
            );
        };

        let classification = decision.classification;
        self.announce(watch, classification, trigger);

        if let Some(refs) = decision.hold_refs {
            self.record_sample(watch, quote.price, false).await;
            let hold = self.hold.attempt(watch, refs, quote.price, trigger).await;
            return (
                CycleOutcome::Priced {
                    classification,
                    persisted: false,
                    hold: Some(hold),
                },
                None,
            );
        }

        self.record_sample(watch, quote.price, decision.persist).await;
        let patch = decision.persist.then(|| {
            let refs = quote
                .bookable_refs
                .iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>();
            WatchPatch::default().with_price(quote.price, refs)
        });

        (
            CycleOutcome::Priced {
                classification,
                persisted: decision.persist,
                hold: None,
            },
            patch,
        )
    }

    /// Emit the price-change notification for `classification`.
    ///
    /// Automatic triggers only surface drops; first observations are silent.
    fn announce(&self, watch: &Watch, classification: Classification, trigger: Trigger) {
        let price_event = |previous, current| PriceEvent {
            subject: WatchSubject::from(watch),
            previous,
            current,
            trigger,
        };

        let event = match (classification, trigger) {
            (Classification::FirstObservation { price }, _) => {
                info!(watch_id = %watch.id, price, "Baseline price recorded");
                return;
            }
            (Classification::Decreased { previous, current }, _) => {
                info!(watch_id = %watch.id, previous, current, "Price decreased");
                Event::PriceDecreased(price_event(previous, current))
            }
            (Classification::Increased { previous, current }, Trigger::Manual) => {
                Event::PriceIncreased(price_event(previous, current))
            }
            (Classification::Unchanged { price }, Trigger::Manual) => {
                Event::PriceUnchanged(price_event(price, price))
            }
            (classification, Trigger::Automatic) => {
                debug!(
                    watch_id = %watch.id,
                    outcome = classification.as_str(),
                    "Suppressed non-actionable automatic outcome"
                );
                return;
            }
        };
        self.notifiers.notify_all(event);
    }

    fn check_failed(&self, watch: &Watch, reason: String, trigger: Trigger) -> CycleOutcome {
        warn!(
            watch_id = %watch.id,
            provider = %watch.provider(),
            %trigger,
            reason = %reason,
            "Price check failed"
        );
        if trigger == Trigger::Manual || self.settings.notify_automatic_failures {
            self.notifiers.notify_all(Event::CheckFailed(FailureEvent {
                subject: WatchSubject::from(watch),
                reason: reason.clone(),
                trigger,
            }));
        }
        CycleOutcome::CheckFailed { reason }
    }

    async fn record_sample(&self, watch: &Watch, price: i64, persisted: bool) {
        let sample = PriceSample {
            watch_id: watch.id.clone(),
            observed_at: self.clock.now(),
            price,
            persisted,
        };
        if let Err(e) = self.store.append_price_sample(&sample).await {
            warn!(watch_id = %watch.id, error = %e, "Failed to record price sample");
        }
    }

    /// Apply the final write and report the stored state.
    async fn finish(&self, mut watch: Watch, patch: &WatchPatch) -> Option<Watch> {
        match self.store.update_watch(&watch.id, patch).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => {
                debug!(watch_id = %watch.id, "Watch deleted during check");
                return None;
            }
            Err(e) => {
                error!(watch_id = %watch.id, error = %e, "Failed to persist check result");
                watch.apply(patch);
                return Some(watch);
            }
        }

        match self.store.get_watch(&watch.id).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(watch_id = %watch.id, error = %e, "Failed to reload watch after check");
                watch.apply(patch);
                Some(watch)
            }
        }
    }
}
