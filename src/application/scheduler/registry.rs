//! Per-watch timer registry owned by the scheduler loop.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::schedule;
use crate::domain::{Watch, WatchId};

#[derive(Debug, Clone)]
struct Armed {
    watch: Watch,
    /// `None` while a cycle for the watch is in flight.
    due_at: Option<DateTime<Utc>>,
}

/// Armed watches and the instant each next becomes due.
///
/// Only active watches are ever armed. A watch is parked while its cycle
/// runs and re-armed from the cycle's result.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    armed: HashMap<WatchId, Armed>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm or refresh `watch`. Inactive watches are disarmed instead.
    ///
    /// A parked watch stays parked; only its stored copy is replaced.
    /// Returns whether the watch is armed afterwards.
    pub fn arm(&mut self, watch: Watch, now: DateTime<Utc>) -> bool {
        if !watch.active {
            self.armed.remove(&watch.id);
            return false;
        }

        let id = watch.id.clone();
        let parked = self.armed.get(&id).is_some_and(|a| a.due_at.is_none());
        let due_at = if parked {
            None
        } else {
            schedule::next_due_at(&watch, now)
        };
        self.armed.insert(id, Armed { watch, due_at });
        true
    }

    /// Remove the timer for `id`. Returns the watch if it was armed.
    pub fn disarm(&mut self, id: &WatchId) -> Option<Watch> {
        self.armed.remove(id).map(|a| a.watch)
    }

    #[must_use]
    pub fn contains(&self, id: &WatchId) -> bool {
        self.armed.contains_key(id)
    }

    #[must_use]
    pub fn watch(&self, id: &WatchId) -> Option<&Watch> {
        self.armed.get(id).map(|a| &a.watch)
    }

    #[must_use]
    pub fn is_parked(&self, id: &WatchId) -> bool {
        self.armed.get(id).is_some_and(|a| a.due_at.is_none())
    }

    /// Stop the timer of `id` while its cycle runs.
    pub fn park(&mut self, id: &WatchId) {
        if let Some(armed) = self.armed.get_mut(id) {
            armed.due_at = None;
        }
    }

    /// Push the next due instant of `id` a full interval past `now`.
    pub fn postpone(&mut self, id: &WatchId, now: DateTime<Utc>) {
        if let Some(armed) = self.armed.get_mut(id) {
            let mut rescheduled = armed.watch.clone();
            rescheduled.last_checked_at = Some(now);
            armed.due_at = schedule::next_due_at(&rescheduled, now);
        }
    }

    /// Re-arm parked watches for which `is_running` is false.
    ///
    /// Returns how many were re-armed.
    pub fn unpark_idle(&mut self, now: DateTime<Utc>, is_running: impl Fn(&WatchId) -> bool) -> usize {
        let mut count = 0;
        for (id, armed) in &mut self.armed {
            if armed.due_at.is_none() && !is_running(id) {
                armed.due_at = schedule::next_due_at(&armed.watch, now);
                count += 1;
            }
        }
        count
    }

    /// Ids of watches due at `now`, earliest first.
    #[must_use]
    pub fn due(&self, now: DateTime<Utc>) -> Vec<WatchId> {
        let mut due: Vec<_> = self
            .armed
            .iter()
            .filter_map(|(id, a)| a.due_at.filter(|at| *at <= now).map(|at| (at, id)))
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id.clone()).collect()
    }

    /// Earliest due instant among watches that are not parked.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.armed.values().filter_map(|a| a.due_at).min()
    }

    /// Armed watches, ordered by id.
    #[must_use]
    pub fn watches(&self) -> Vec<&Watch> {
        let mut watches: Vec<_> = self.armed.values().map(|a| &a.watch).collect();
        watches.sort_by(|a, b| a.id.cmp(&b.id));
        watches
    }

    /// Ids of armed watches that are not parked.
    #[must_use]
    pub fn idle_ids(&self) -> Vec<WatchId> {
        self.armed
            .iter()
            .filter(|(_, a)| a.due_at.is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Itinerary, Leg, Provider};
    use chrono::{Duration, NaiveDate};

    fn watch(id: &str) -> Watch {
        Watch::new(
            "owner",
            Itinerary::one_way(
                Provider::Alpha,
                Leg::new("HAN", "SGN", NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()),
            ),
            600,
        )
        .with_id(id)
    }

    #[test]
    fn never_checked_watch_is_due_immediately() {
        let now = Utc::now();
        let mut registry = TimerRegistry::new();
        assert!(registry.arm(watch("w-1"), now));
        assert_eq!(registry.due(now), vec![WatchId::from("w-1")]);
    }

    #[test]
    fn inactive_watch_is_never_armed() {
        let now = Utc::now();
        let mut registry = TimerRegistry::new();
        let mut inactive = watch("w-1");
        inactive.active = false;

        assert!(!registry.arm(inactive, now));
        assert!(registry.is_empty());
        assert!(registry.due(now).is_empty());
    }

    #[test]
    fn deactivating_disarms() {
        let now = Utc::now();
        let mut registry = TimerRegistry::new();
        registry.arm(watch("w-1"), now);

        let mut inactive = watch("w-1");
        inactive.active = false;
        registry.arm(inactive, now);
        assert!(!registry.contains(&WatchId::from("w-1")));
    }

    #[test]
    fn checked_watch_waits_full_interval() {
        let now = Utc::now();
        let mut checked = watch("w-1");
        checked.last_checked_at = Some(now);

        let mut registry = TimerRegistry::new();
        registry.arm(checked, now);

        assert!(registry.due(now + Duration::seconds(599)).is_empty());
        assert_eq!(registry.due(now + Duration::seconds(600)).len(), 1);
        assert_eq!(registry.next_deadline(), Some(now + Duration::seconds(600)));
    }

    #[test]
    fn parked_watch_is_not_due_until_rearmed() {
        let now = Utc::now();
        let id = WatchId::from("w-1");
        let mut registry = TimerRegistry::new();
        registry.arm(watch("w-1"), now);

        registry.park(&id);
        assert!(registry.due(now).is_empty());
        assert!(registry.next_deadline().is_none());

        // Refreshing a parked watch keeps it parked
        registry.arm(watch("w-1"), now);
        assert!(registry.is_parked(&id));

        assert_eq!(registry.unpark_idle(now, |_| false), 1);
        assert_eq!(registry.due(now), vec![id]);
    }

    #[test]
    fn postpone_waits_an_interval_from_now() {
        let now = Utc::now();
        let id = WatchId::from("w-1");
        let mut registry = TimerRegistry::new();
        registry.arm(watch("w-1"), now);

        registry.postpone(&id, now);
        assert!(registry.due(now).is_empty());
        assert_eq!(registry.next_deadline(), Some(now + Duration::seconds(600)));
    }

    #[test]
    fn due_is_ordered_earliest_first() {
        let now = Utc::now();
        let mut early = watch("b");
        early.last_checked_at = Some(now - Duration::seconds(1200));
        let mut late = watch("a");
        late.last_checked_at = Some(now - Duration::seconds(700));

        let mut registry = TimerRegistry::new();
        registry.arm(late, now);
        registry.arm(early, now);

        assert_eq!(
            registry.due(now),
            vec![WatchId::from("b"), WatchId::from("a")]
        );
    }
}
