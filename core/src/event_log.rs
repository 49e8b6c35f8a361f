//! Bounded, append-only event history.
//!
//! The log holds at most `capacity` events. The append that pushes it past
//! the cap triggers a bulk eviction down to the newest `retain` events, so the
//! retained length follows a sawtooth rather than a sliding window. Window
//! queries over long spans must tolerate the resulting gaps.

use std::sync::{Arc, PoisonError, RwLock};

use crate::combat_log::CombatEvent;

/// Hard cap on stored events.
pub const LOG_CAPACITY: usize = 10_000;
/// Events kept after an eviction.
pub const LOG_RETAIN: usize = 5_000;

#[derive(Debug)]
pub struct EventLog {
    events: RwLock<Vec<Arc<CombatEvent>>>,
    capacity: usize,
    retain: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_limits(LOG_CAPACITY, LOG_RETAIN)
    }

    /// Custom limits. `capacity` is at least 1 and `retain` is clamped to
    /// `1..=capacity`, so the event that triggers an eviction is always kept.
    pub fn with_limits(capacity: usize, retain: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(Vec::with_capacity(capacity + 1)),
            capacity,
            retain: retain.clamp(1, capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn retain(&self) -> usize {
        self.retain
    }

    /// Append an event, evicting in bulk if the cap is exceeded.
    /// Returns the shared handle that was stored.
    pub fn append(&self, event: CombatEvent) -> Arc<CombatEvent> {
        let event = Arc::new(event);
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        events.push(Arc::clone(&event));
        if events.len() > self.capacity {
            self.evict_oldest(&mut events);
        }
        event
    }

    /// Drop everything but the newest `retain` events.
    fn evict_oldest(&self, events: &mut Vec<Arc<CombatEvent>>) {
        let evicted = events.len().saturating_sub(self.retain);
        events.drain(..evicted);
        tracing::debug!(evicted, retained = events.len(), "Evicted oldest combat events");
    }

    /// Copy of the current log in insertion order. Later appends don't affect it.
    pub fn snapshot(&self) -> Vec<Arc<CombatEvent>> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The newest `limit` events matching `filter`, newest first.
    pub fn recent<F>(&self, limit: usize, filter: F) -> Vec<Arc<CombatEvent>>
    where
        F: Fn(&CombatEvent) -> bool,
    {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .filter(|e| filter(e))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::StatusEvent;
    use chrono::NaiveDateTime;

    /// Status event tagged with its 1-based append sequence in `stack_count`.
    fn numbered(seq: u32) -> CombatEvent {
        CombatEvent::Status(StatusEvent {
            timestamp: NaiveDateTime::default(),
            target_id: "e1".into(),
            target_name: None,
            status_id: "A1".into(),
            status_name: "thunder".into(),
            stack_count: seq,
            duration: 0.0,
            is_applied: true,
        })
    }

    fn seq_of(event: &CombatEvent) -> u32 {
        event.as_status().map(|s| s.stack_count).unwrap_or(0)
    }

    fn fill(log: &EventLog, count: u32) {
        for seq in 1..=count {
            log.append(numbered(seq));
        }
    }

    #[test]
    fn holds_up_to_capacity() {
        let log = EventLog::new();
        fill(&log, 10_000);
        assert_eq!(log.len(), 10_000);
        assert_eq!(seq_of(&log.snapshot()[0]), 1);
    }

    #[test]
    fn exceeding_capacity_evicts_to_retain() {
        let log = EventLog::new();
        fill(&log, 10_001);

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 5_000);
        assert_eq!(seq_of(&snapshot[0]), 5_002);
        assert_eq!(seq_of(&snapshot[4_999]), 10_001);
    }

    #[test]
    fn sawtooth_after_eviction() {
        // After the first eviction the log refills from 5,000 and only evicts
        // again once it passes 10,000
        let log = EventLog::new();
        fill(&log, 12_001);
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 7_000);
        assert_eq!(seq_of(&snapshot[0]), 5_002);

        // Exactly at the cap: no second eviction yet
        let log = EventLog::new();
        fill(&log, 15_001);
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 10_000);
        assert_eq!(seq_of(&snapshot[0]), 5_002);

        log.append(numbered(15_002));
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 5_000);
        assert_eq!(seq_of(&snapshot[0]), 10_003);
        assert_eq!(seq_of(&snapshot[4_999]), 15_002);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let log = EventLog::with_limits(10, 4);
        for seq in 1..=100 {
            log.append(numbered(seq));
            assert!(log.len() <= 10);
        }
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let log = EventLog::with_limits(4, 2);
        fill(&log, 3);
        let before = log.snapshot();
        fill(&log, 5);
        assert_eq!(before.len(), 3);
        assert_eq!(before.iter().map(|e| seq_of(e)).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn recent_is_newest_first() {
        let log = EventLog::new();
        fill(&log, 6);
        let recent: Vec<u32> = log.recent(3, |_| true).iter().map(|e| seq_of(e)).collect();
        assert_eq!(recent, vec![6, 5, 4]);

        let even: Vec<u32> = log
            .recent(10, |e| seq_of(e) % 2 == 0)
            .iter()
            .map(|e| seq_of(e))
            .collect();
        assert_eq!(even, vec![6, 4, 2]);
        assert!(log.recent(0, |_| true).is_empty());
    }

    #[test]
    fn limits_are_clamped() {
        let log = EventLog::with_limits(0, 10);
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.retain(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn zero_retain_keeps_the_triggering_event() {
        let log = EventLog::with_limits(3, 0);
        assert_eq!(log.retain(), 1);
        fill(&log, 3);

        let stored = log.append(numbered(4));
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot[0], &stored));
    }
}
