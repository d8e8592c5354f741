//! Notifier port for watch events.
//!
//! The engine decides *that* a user should hear about something and with
//! which payload; delivery (chat message, sound, toast) belongs to the
//! notifier implementations.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{OwnerId, ReservationCode, Trigger, Watch, WatchId};

/// Kinds of user-visible outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    PriceDecreased,
    PriceIncreased,
    PriceUnchanged,
    CheckFailed,
    HoldSucceeded,
    HoldFailed,
    HoldSkippedAlreadyIssued,
}

impl NotificationKind {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceDecreased => "price_decreased",
            Self::PriceIncreased => "price_increased",
            Self::PriceUnchanged => "price_unchanged",
            Self::CheckFailed => "check_failed",
            Self::HoldSucceeded => "hold_succeeded",
            Self::HoldFailed => "hold_failed",
            Self::HoldSkippedAlreadyIssued => "hold_skipped_already_issued",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who and what an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSubject {
    pub watch_id: WatchId,
    pub owner: OwnerId,
    /// Human-readable itinerary summary.
    pub itinerary: String,
}

impl From<&Watch> for WatchSubject {
    fn from(watch: &Watch) -> Self {
        Self {
            watch_id: watch.id.clone(),
            owner: watch.owner.clone(),
            itinerary: watch.itinerary.to_string(),
        }
    }
}

/// Price comparison event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEvent {
    pub subject: WatchSubject,
    pub previous: i64,
    pub current: i64,
    pub trigger: Trigger,
}

/// Failed check or failed hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    pub subject: WatchSubject,
    pub reason: String,
    pub trigger: Trigger,
}

/// Hold placed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldEvent {
    pub subject: WatchSubject,
    pub code: ReservationCode,
    pub price: i64,
    pub expires_at: Option<DateTime<Utc>>,
    /// Prior reservation marked as superseded by this hold.
    pub superseded: Option<ReservationCode>,
}

/// Hold abandoned because the prior reservation is already issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub subject: WatchSubject,
    /// `None` when the provider reported the issue during hold creation.
    pub prior: Option<ReservationCode>,
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PriceDecreased(PriceEvent),
    PriceIncreased(PriceEvent),
    PriceUnchanged(PriceEvent),
    CheckFailed(FailureEvent),
    HoldSucceeded(HoldEvent),
    HoldFailed(FailureEvent),
    HoldSkippedAlreadyIssued(SkippedEvent),
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::PriceDecreased(_) => NotificationKind::PriceDecreased,
            Self::PriceIncreased(_) => NotificationKind::PriceIncreased,
            Self::PriceUnchanged(_) => NotificationKind::PriceUnchanged,
            Self::CheckFailed(_) => NotificationKind::CheckFailed,
            Self::HoldSucceeded(_) => NotificationKind::HoldSucceeded,
            Self::HoldFailed(_) => NotificationKind::HoldFailed,
            Self::HoldSkippedAlreadyIssued(_) => NotificationKind::HoldSkippedAlreadyIssued,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &WatchSubject {
        match self {
            Self::PriceDecreased(e) | Self::PriceIncreased(e) | Self::PriceUnchanged(e) => {
                &e.subject
            }
            Self::CheckFailed(e) | Self::HoldFailed(e) => &e.subject,
            Self::HoldSucceeded(e) => &e.subject,
            Self::HoldSkippedAlreadyIssued(e) => &e.subject,
        }
    }

    #[must_use]
    pub fn watch_id(&self) -> &WatchId {
        &self.subject().watch_id
    }
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget: `notify` must return quickly and
/// push slow delivery onto a background task.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier {
        count: Arc<AtomicUsize>,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _event: Event) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn skipped() -> Event {
        Event::HoldSkippedAlreadyIssued(SkippedEvent {
            subject: WatchSubject {
                watch_id: WatchId::from("w-1"),
                owner: OwnerId::new("owner"),
                itinerary: "[alpha] HAN→SGN 2026-11-02".into(),
            },
            prior: Some(ReservationCode::new("ABC123")),
        })
    }

    #[test]
    fn test_registry_notify_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();

        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));
        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));

        registry.notify_all(skipped());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn event_exposes_kind_and_watch() {
        let event = skipped();
        assert_eq!(event.kind(), NotificationKind::HoldSkippedAlreadyIssued);
        assert_eq!(event.watch_id().as_str(), "w-1");
        assert_eq!(event.kind().to_string(), "hold_skipped_already_issued");
    }

    #[test]
    fn test_registry_len_and_is_empty() {
        let mut registry = NotifierRegistry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(CountingNotifier {
            count: Arc::new(AtomicUsize::new(0)),
        }));
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
