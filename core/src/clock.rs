//! Time sources for event stamping and window queries.
//!
//! Events are stamped when they are normalized, never from the payload, and
//! statistics measure windows against the same clock.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use chrono::{Local, NaiveDateTime, TimeDelta};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall time anchored at construction and advanced by a monotonic
/// `Instant`, so stamps never go backwards when the system clock is adjusted.
#[derive(Debug, Clone)]
pub struct SystemClock {
    wall_anchor: NaiveDateTime,
    anchor: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            wall_anchor: Local::now().naive_local(),
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = TimeDelta::from_std(self.anchor.elapsed()).unwrap_or(TimeDelta::zero());
        self.wall_anchor
            .checked_add_signed(elapsed)
            .unwrap_or(self.wall_anchor)
    }
}

/// Clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the current local time.
    pub fn starting_now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(by).unwrap_or(*now);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(TimeDelta::seconds(secs));
    }

    pub fn advance_millis(&self, millis: i64) {
        self.advance(TimeDelta::milliseconds(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advances_only_on_request() {
        let start = NaiveDateTime::parse_from_str("2025-01-01 20:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_secs(2);
        clock.advance_millis(500);
        assert_eq!(clock.now() - start, TimeDelta::milliseconds(2500));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
