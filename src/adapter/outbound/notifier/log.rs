//! Tracing-backed notifier.

use tracing::{info, warn};

use crate::port::outbound::notifier::{Event, Notifier};

/// Writes every event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        let kind = event.kind();
        match event {
            Event::PriceDecreased(e) | Event::PriceIncreased(e) | Event::PriceUnchanged(e) => {
                info!(
                    kind = %kind,
                    watch_id = %e.subject.watch_id,
                    previous = e.previous,
                    current = e.current,
                    trigger = %e.trigger,
                    "Price checked"
                );
            }
            Event::CheckFailed(e) | Event::HoldFailed(e) => {
                warn!(
                    kind = %kind,
                    watch_id = %e.subject.watch_id,
                    reason = %e.reason,
                    trigger = %e.trigger,
                    "Watch action failed"
                );
            }
            Event::HoldSucceeded(e) => {
                info!(
                    kind = %kind,
                    watch_id = %e.subject.watch_id,
                    code = %e.code,
                    price = e.price,
                    expires_at = ?e.expires_at,
                    superseded = ?e.superseded,
                    "Hold placed"
                );
            }
            Event::HoldSkippedAlreadyIssued(e) => {
                info!(
                    kind = %kind,
                    watch_id = %e.subject.watch_id,
                    prior = ?e.prior,
                    "Hold skipped, prior reservation already issued"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerId, Trigger, WatchId};
    use crate::port::outbound::notifier::{FailureEvent, NotifierRegistry, WatchSubject};

    fn subject() -> WatchSubject {
        WatchSubject {
            watch_id: WatchId::from("w-1"),
            owner: OwnerId::new("owner"),
            itinerary: "[alpha] HAN→SGN 2026-11-02".into(),
        }
    }

    #[test]
    fn log_notifier_accepts_every_kind() {
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(LogNotifier));
        registry.notify_all(Event::CheckFailed(FailureEvent {
            subject: subject(),
            reason: "provider unreachable: timeout".into(),
            trigger: Trigger::Automatic,
        }));
        assert_eq!(registry.len(), 1);
    }
}
