//! Watch management operator implementation.

use async_trait::async_trait;
use tracing::info;

use crate::application::cycle::{CycleOutcome, CycleReport, SkipReason};
use crate::application::hold::HoldOutcome;
use crate::domain::schedule;
use crate::domain::{Trigger, Watch};
use crate::error::{Error, Result, StorageError};
use crate::infrastructure::bootstrap;
use crate::port::inbound::operator::watch::{CheckSummary, WatchOperator, WatchSummary};
use crate::port::outbound::clock::{Clock, MonotonicClock};

use super::{entry::Operator, shared};

#[async_trait]
impl WatchOperator for Operator {
    async fn list_watches(&self, config_toml: &str) -> Result<Vec<WatchSummary>> {
        let config = shared::parse_config(config_toml)?;
        let store = bootstrap::open_store(&config)?;

        let mut watches = store.list_active_watches().await?;
        watches.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let now = MonotonicClock::new().now();
        Ok(watches
            .iter()
            .map(|watch| WatchSummary {
                id: watch.id.to_string(),
                provider: watch.provider().to_string(),
                itinerary: watch.itinerary.to_string(),
                current_price: watch.current_price,
                last_checked_at: watch.last_checked_at,
                progress: schedule::progress(watch, now),
                auto_hold: watch.auto_hold,
            })
            .collect())
    }

    async fn check_watch(&self, config_toml: &str, watch_id: &str) -> Result<CheckSummary> {
        let config = shared::parse_config(config_toml)?;
        let id = shared::parse_watch_id(watch_id)?;
        let store = bootstrap::open_store(&config)?;

        let watch = store
            .get_watch(&id)
            .await?
            .ok_or(Error::Storage(StorageError::NotFound))?;

        let engine = bootstrap::build_engine(&config, store)?;
        let Some(lease) = engine.guard.try_acquire(&id, Trigger::Manual) else {
            return Ok(CheckSummary {
                watch_id: id.to_string(),
                outcome: "already_running".to_string(),
                detail: None,
                current_price: watch.current_price,
                retired: false,
            });
        };

        let report = engine.cycle.run(lease, watch).await;
        Ok(summarize(id.to_string(), report))
    }

    async fn add_watch(&self, config_toml: &str, watch_json: &str) -> Result<String> {
        let config = shared::parse_config(config_toml)?;
        let watch: Watch = serde_json::from_str(watch_json)?;
        watch.validate()?;

        let store = bootstrap::open_store(&config)?;
        store.insert_watch(&watch).await?;

        info!(
            watch_id = %watch.id,
            provider = %watch.provider(),
            itinerary = %watch.itinerary,
            "Watch added"
        );
        Ok(watch.id.to_string())
    }

    async fn remove_watch(&self, config_toml: &str, watch_id: &str) -> Result<()> {
        let config = shared::parse_config(config_toml)?;
        let id = shared::parse_watch_id(watch_id)?;
        let store = bootstrap::open_store(&config)?;

        store.delete_watch(&id).await?;
        info!(watch_id = %id, "Watch removed");
        Ok(())
    }
}

fn summarize(watch_id: String, report: CycleReport) -> CheckSummary {
    let detail = match &report.outcome {
        CycleOutcome::Skipped(SkipReason::InFlightElsewhere) => {
            Some("another process is checking this watch".to_string())
        }
        CycleOutcome::Skipped(SkipReason::Retired) => None,
        CycleOutcome::Skipped(SkipReason::StoreUnavailable(reason))
        | CycleOutcome::CheckFailed { reason } => Some(reason.clone()),
        CycleOutcome::Priced { hold: Some(hold), .. } => Some(hold_detail(hold)),
        CycleOutcome::Priced { hold: None, .. } => None,
    };

    CheckSummary {
        watch_id,
        outcome: report.outcome.label().to_string(),
        detail,
        current_price: report.watch.as_ref().and_then(|w| w.current_price),
        retired: report.rearmable().is_none(),
    }
}

fn hold_detail(hold: &HoldOutcome) -> String {
    match hold {
        HoldOutcome::Reserved(attempt) => match &attempt.result {
            Ok(confirmation) => format!("hold placed: {}", confirmation.code),
            Err(reason) => format!("hold placed with errors: {reason}"),
        },
        HoldOutcome::SkippedAlreadyIssued { prior } => match prior {
            Some(code) => format!("hold skipped: {code} is already issued"),
            None => "hold skipped: already issued".to_string(),
        },
        HoldOutcome::Failed { reason, .. } => format!("hold failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::policy::Classification;
    use crate::domain::{Provider, ReservationAttempt, ReservationCode, ReservationConfirmation};
    use crate::testkit::domain::one_way_watch;

    fn report(outcome: CycleOutcome, watch: Option<Watch>) -> CycleReport {
        CycleReport {
            trigger: Trigger::Manual,
            checked_at: Utc::now(),
            outcome,
            watch,
        }
    }

    #[test]
    fn failed_check_carries_reason() {
        let watch = one_way_watch().with_price(420);
        let summary = summarize(
            "w1".to_string(),
            report(
                CycleOutcome::CheckFailed {
                    reason: "provider returned no itineraries".to_string(),
                },
                Some(watch),
            ),
        );

        assert_eq!(summary.outcome, "check_failed");
        assert_eq!(summary.detail.as_deref(), Some("provider returned no itineraries"));
        assert_eq!(summary.current_price, Some(420));
        assert!(!summary.retired);
    }

    #[test]
    fn successful_hold_retires_watch() {
        let attempt = ReservationAttempt {
            provider: Provider::Alpha,
            bookable_refs: Vec::new(),
            result: Ok(ReservationConfirmation {
                code: ReservationCode::new("abc123"),
                expires_at: None,
            }),
        };

        let summary = summarize(
            "w1".to_string(),
            report(
                CycleOutcome::Priced {
                    classification: Classification::Decreased {
                        previous: 500,
                        current: 400,
                    },
                    persisted: false,
                    hold: Some(HoldOutcome::Reserved(attempt)),
                },
                None,
            ),
        );

        assert_eq!(summary.outcome, "decreased");
        assert_eq!(summary.detail.as_deref(), Some("hold placed: ABC123"));
        assert!(summary.retired);
    }

    #[test]
    fn check_held_elsewhere_is_reported_as_already_running() {
        let watch = one_way_watch().with_price(420);
        let summary = summarize(
            "w1".to_string(),
            report(CycleOutcome::Skipped(SkipReason::InFlightElsewhere), Some(watch)),
        );

        assert_eq!(summary.outcome, "already_running");
        assert_eq!(summary.current_price, Some(420));
        assert!(!summary.retired);
    }

    #[test]
    fn deactivated_watch_is_reported_retired() {
        let mut watch = one_way_watch();
        watch.active = false;
        let summary = summarize(
            "w1".to_string(),
            report(CycleOutcome::Skipped(SkipReason::Retired), Some(watch)),
        );

        assert_eq!(summary.outcome, "retired");
        assert_eq!(summary.detail, None);
        assert!(summary.retired);
    }
}
