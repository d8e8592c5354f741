//! Auto-hold orchestration.
//!
//! Runs inside the check cycle of a watch, so it is covered by the same
//! in-flight lease: a watch is never the subject of two hold attempts.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    BookableRef, ReservationAttempt, ReservationCode, ReservationRecord, ReservationRequest,
    Trigger, Watch, WatchPatch,
};
use crate::error::{ReservationError, StorageError};
use crate::port::outbound::clock::Clock;
use crate::port::outbound::notifier::{
    Event, FailureEvent, HoldEvent, NotifierRegistry, SkippedEvent, WatchSubject,
};
use crate::port::outbound::reservation::ReservationGateway;
use crate::port::outbound::store::WatchStore;

/// How a hold attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
    /// A hold was placed and recorded; the watch is retired.
    Reserved(ReservationAttempt),
    /// The prior reservation is already issued; the watch is retired unchanged.
    SkippedAlreadyIssued { prior: Option<ReservationCode> },
    /// Nothing was reserved; the watch stays armed.
    Failed {
        reason: String,
        attempt: Option<ReservationAttempt>,
    },
}

impl HoldOutcome {
    /// Whether the watch was deleted as a result of this attempt.
    #[must_use]
    pub fn retires_watch(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Places holds on qualifying price drops.
pub struct AutoHoldOrchestrator {
    gateway: Arc<dyn ReservationGateway>,
    store: Arc<dyn WatchStore>,
    notifiers: Arc<NotifierRegistry>,
    clock: Arc<dyn Clock>,
}

impl AutoHoldOrchestrator {
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        store: Arc<dyn WatchStore>,
        notifiers: Arc<NotifierRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            store,
            notifiers,
            clock,
        }
    }

    /// Try to reserve `watch` at `price` using the quoted references.
    ///
    /// Emits exactly one of `holdSucceeded`, `holdFailed` or
    /// `holdSkippedAlreadyIssued`.
    pub async fn attempt(
        &self,
        watch: &Watch,
        refs: Vec<BookableRef>,
        price: i64,
        trigger: Trigger,
    ) -> HoldOutcome {
        if let Some(prior) = &watch.prior_reservation {
            match self
                .gateway
                .reservation_status(watch.provider(), prior)
                .await
            {
                Ok(status) if status.is_finalized() => {
                    return self.skip_issued(watch, Some(prior.clone())).await;
                }
                Err(ReservationError::AlreadyIssued) => {
                    return self.skip_issued(watch, Some(prior.clone())).await;
                }
                Ok(status) => {
                    info!(watch_id = %watch.id, prior = %prior, ?status, "Prior reservation still open");
                }
                Err(e) => {
                    let reason = format!("could not verify prior reservation {prior}: {e}");
                    return self.fail(watch, reason, None, trigger);
                }
            }
        }

        let request = match ReservationRequest::build(watch, refs) {
            Ok(request) => request,
            Err(e) => return self.fail(watch, e.to_string(), None, trigger),
        };

        let confirmation = match self.gateway.create_hold(&request).await {
            Ok(confirmation) => confirmation,
            Err(ReservationError::AlreadyIssued) => {
                return self
                    .skip_issued(watch, watch.prior_reservation.clone())
                    .await;
            }
            Err(e) => {
                let attempt = ReservationAttempt::new(&request, Err(e.to_string()));
                return self.fail(watch, e.to_string(), Some(attempt), trigger);
            }
        };

        let attempt = ReservationAttempt::new(&request, Ok(confirmation.clone()));
        let record = ReservationRecord::new(
            watch,
            &request,
            &confirmation,
            price,
            self.clock.now(),
        );

        match self.store.insert_reservation(&record).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => {
                warn!(watch_id = %watch.id, code = %record.code, "Reservation already recorded");
            }
            Err(e) => {
                let reason = format!(
                    "hold {} was placed but could not be saved: {e}",
                    confirmation.code
                );
                return self.fail(watch, reason, Some(attempt), trigger);
            }
        }

        if let Some(prior) = &watch.prior_reservation {
            match self
                .store
                .supersede_reservation(prior, &confirmation.code)
                .await
            {
                Ok(()) | Err(StorageError::NotFound) => {}
                Err(e) => {
                    warn!(watch_id = %watch.id, prior = %prior, error = %e, "Failed to mark prior reservation superseded");
                }
            }
        }

        self.retire(watch).await;

        info!(
            watch_id = %watch.id,
            provider = %watch.provider(),
            code = %confirmation.code,
            price,
            "Hold placed"
        );
        self.notifiers.notify_all(Event::HoldSucceeded(HoldEvent {
            subject: WatchSubject::from(watch),
            code: confirmation.code,
            price,
            expires_at: confirmation.expires_at,
            superseded: watch.prior_reservation.clone(),
        }));

        HoldOutcome::Reserved(attempt)
    }

    async fn skip_issued(&self, watch: &Watch, prior: Option<ReservationCode>) -> HoldOutcome {
        info!(watch_id = %watch.id, prior = ?prior.as_ref().map(ReservationCode::as_str), "Prior reservation already issued, retiring watch");
        self.retire(watch).await;

        self.notifiers
            .notify_all(Event::HoldSkippedAlreadyIssued(SkippedEvent {
                subject: WatchSubject::from(watch),
                prior: prior.clone(),
            }));

        HoldOutcome::SkippedAlreadyIssued { prior }
    }

    fn fail(
        &self,
        watch: &Watch,
        reason: String,
        attempt: Option<ReservationAttempt>,
        trigger: Trigger,
    ) -> HoldOutcome {
        warn!(watch_id = %watch.id, provider = %watch.provider(), reason = %reason, "Hold failed");
        self.notifiers.notify_all(Event::HoldFailed(FailureEvent {
            subject: WatchSubject::from(watch),
            reason: reason.clone(),
            trigger,
        }));
        HoldOutcome::Failed { reason, attempt }
    }

    /// Delete the watch; fall back to deactivating it.
    async fn retire(&self, watch: &Watch) {
        match self.store.delete_watch(&watch.id).await {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(e) => {
                error!(watch_id = %watch.id, error = %e, "Failed to delete retired watch");
                let patch = WatchPatch {
                    active: Some(false),
                    ..WatchPatch::default()
                };
                if let Err(e) = self.store.update_watch(&watch.id, &patch).await {
                    error!(watch_id = %watch.id, error = %e, "Failed to deactivate retired watch");
                }
            }
        }
    }
}
