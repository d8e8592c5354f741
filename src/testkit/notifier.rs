//! Recording notifier for asserting emitted events.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::outbound::notifier::{Event, NotificationKind, Notifier};

/// Notifier that keeps every event it receives.
///
/// Clones share the same buffer, so keep one clone and register the other.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.events.lock().iter().map(Event::kind).collect()
    }

    /// Events about the watch `id`.
    pub fn for_watch(&self, id: &str) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.watch_id().as_str() == id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
