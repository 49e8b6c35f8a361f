//! Windowed statistics over the event log
//!
//! Everything here is recomputed from a log snapshot on each query; nothing
//! is cached between calls. The free functions take the snapshot and the
//! evaluation instant explicitly. [`StatsEngine`] supplies both from the
//! shared log and clock.
//!
//! # Windowing
//!
//! An event is inside a window of `w` seconds when `now - timestamp < w`.
//! The rate divisor is `min(w, now - earliest_in_window)` floored to one
//! second, so a burst of hits never divides by zero.


use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use limitbreak_types::{CombatantStats, EncounterSummary, HealingStats};

use crate::clock::Clock;
use crate::combat_log::CombatEvent;
use crate::event_log::EventLog;

const MIN_DURATION_SECS: f64 = 1.0;

pub struct StatsEngine {
    log: Arc<EventLog>,
    clock: Arc<dyn Clock>,
    default_window: u64,
}

impl StatsEngine {
    pub fn new(log: Arc<EventLog>, clock: Arc<dyn Clock>, default_window: u64) -> Self {
        Self {
            log,
            clock,
            default_window,
        }
    }

    pub fn default_window(&self) -> u64 {
        self.default_window
    }

    pub fn windowed_stats(&self, combatant_id: &str, window_secs: u64) -> CombatantStats {
        combatant_stats(&self.log.snapshot(), combatant_id, window_secs, self.clock.now())
    }

    pub fn windowed_healing(&self, combatant_id: &str, window_secs: u64) -> HealingStats {
        healing_stats(&self.log.snapshot(), combatant_id, window_secs, self.clock.now())
    }

    pub fn all_stats(&self, window_secs: u64) -> Vec<CombatantStats> {
        all_combatant_stats(&self.log.snapshot(), window_secs, self.clock.now())
    }

    /// Summary of the whole log, with per-participant stats over the
    /// default window.
    pub fn encounter_summary(&self) -> EncounterSummary {
        summarize(&self.log.snapshot(), self.default_window, self.clock.now())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window helpers
// ─────────────────────────────────────────────────────────────────────────────

fn window_delta(window_secs: u64) -> TimeDelta {
    i64::try_from(window_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

fn secs_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    later.signed_duration_since(earlier).num_milliseconds() as f64 / 1000.0
}

/// Divisor for per-second rates: time since the earliest event in the
/// window, capped at the window length and floored to one second.
fn rate_duration(earliest: Option<NaiveDateTime>, window_secs: u64, now: NaiveDateTime) -> f64 {
    earliest
        .map(|ts| secs_between(ts, now).min(window_secs as f64))
        .unwrap_or(0.0)
        .max(MIN_DURATION_SECS)
}

fn percent(count: u32, total: u32) -> f64 {
    f64::from(count) / f64::from(total.max(1)) * 100.0
}

fn in_window(event: &CombatEvent, window: TimeDelta, now: NaiveDateTime) -> bool {
    now.signed_duration_since(event.timestamp()) < window
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-combatant
// ─────────────────────────────────────────────────────────────────────────────

/// Damage dealt by `combatant_id` within the trailing window ending at `now`.
pub fn combatant_stats(
    events: &[Arc<CombatEvent>],
    combatant_id: &str,
    window_secs: u64,
    now: NaiveDateTime,
) -> CombatantStats {
    let mut stats = CombatantStats::empty(combatant_id);
    if window_secs == 0 {
        return stats;
    }

    let window = window_delta(window_secs);
    let mut earliest: Option<NaiveDateTime> = None;

    for dmg in events
        .iter()
        .filter(|e| in_window(e, window, now))
        .filter_map(|e| e.as_damage())
        .filter(|d| d.source_id == combatant_id)
    {
        stats.total_damage = stats.total_damage.saturating_add(dmg.damage);
        stats.hit_count += 1;
        if dmg.is_critical {
            stats.critical_hits += 1;
        }
        if dmg.is_direct_hit {
            stats.direct_hits += 1;
        }
        earliest = Some(earliest.map_or(dmg.timestamp, |ts| ts.min(dmg.timestamp)));
    }

    if stats.hit_count == 0 {
        return stats;
    }

    stats.dps = stats.total_damage as f64 / rate_duration(earliest, window_secs, now);
    stats.critical_rate = percent(stats.critical_hits, stats.hit_count);
    stats.direct_hit_rate = percent(stats.direct_hits, stats.hit_count);
    stats
}

/// Healing done by `combatant_id` within the trailing window ending at `now`.
pub fn healing_stats(
    events: &[Arc<CombatEvent>],
    combatant_id: &str,
    window_secs: u64,
    now: NaiveDateTime,
) -> HealingStats {
    let mut stats = HealingStats::empty(combatant_id);
    if window_secs == 0 {
        return stats;
    }

    let window = window_delta(window_secs);
    let mut earliest: Option<NaiveDateTime> = None;

    for heal in events
        .iter()
        .filter(|e| in_window(e, window, now))
        .filter_map(|e| e.as_heal())
        .filter(|h| h.source_id == combatant_id)
    {
        stats.total_healing = stats.total_healing.saturating_add(heal.heal_amount);
        stats.total_overheal = stats.total_overheal.saturating_add(heal.overheal_amount);
        stats.heal_count += 1;
        if heal.is_critical {
            stats.critical_heals += 1;
        }
        earliest = Some(earliest.map_or(heal.timestamp, |ts| ts.min(heal.timestamp)));
    }

    if stats.heal_count == 0 {
        return stats;
    }

    stats.hps = stats.total_healing as f64 / rate_duration(earliest, window_secs, now);
    let output = stats.total_healing.saturating_add(stats.total_overheal);
    if output > 0 {
        stats.overheal_percent = stats.total_overheal as f64 / output as f64 * 100.0;
    }
    stats.critical_rate = percent(stats.critical_heals, stats.heal_count);
    stats
}

// ─────────────────────────────────────────────────────────────────────────────
// Whole log
// ─────────────────────────────────────────────────────────────────────────────

/// Every source and target identifier in the log, sorted.
pub fn participants(events: &[Arc<CombatEvent>]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for event in events {
        if let Some(source) = event.source_id() {
            ids.insert(source.to_string());
        }
        ids.insert(event.target_id().to_string());
    }
    ids
}

/// Stats for every participant, highest damage first (ties by id).
pub fn all_combatant_stats(
    events: &[Arc<CombatEvent>],
    window_secs: u64,
    now: NaiveDateTime,
) -> Vec<CombatantStats> {
    let mut all: Vec<CombatantStats> = participants(events)
        .iter()
        .map(|id| combatant_stats(events, id, window_secs, now))
        .collect();
    all.sort_by(|a, b| {
        b.total_damage
            .cmp(&a.total_damage)
            .then_with(|| a.combatant_id.cmp(&b.combatant_id))
    });
    all
}

/// Summarize the whole log as of `now`.
///
/// Each participant's stats re-scan the snapshot, so this is O(events ×
/// participants). The log is bounded, which keeps that acceptable, and it
/// guarantees the per-participant numbers match [`combatant_stats`] exactly.
pub fn summarize(
    events: &[Arc<CombatEvent>],
    window_secs: u64,
    now: NaiveDateTime,
) -> EncounterSummary {
    let start_time = events.iter().map(|e| e.timestamp()).min().unwrap_or(now);
    let end_time = events.iter().map(|e| e.timestamp()).max().unwrap_or(now);
    let duration_secs = secs_between(start_time, end_time);

    let mut damage_events = 0;
    let mut heal_events = 0;
    let mut status_events = 0;
    let mut total_damage: u64 = 0;
    let mut total_healing: u64 = 0;

    for event in events {
        match event.as_ref() {
            CombatEvent::Damage(d) => {
                damage_events += 1;
                total_damage = total_damage.saturating_add(d.damage);
            }
            CombatEvent::Heal(h) => {
                heal_events += 1;
                total_healing = total_healing.saturating_add(h.heal_amount);
            }
            CombatEvent::Status(_) => status_events += 1,
        }
    }

    let ids = participants(events);
    let participant_stats = ids
        .iter()
        .map(|id| (id.clone(), combatant_stats(events, id, window_secs, now)))
        .collect();

    let divisor = duration_secs.max(MIN_DURATION_SECS);

    EncounterSummary {
        start_time,
        end_time,
        duration_secs,
        total_events: events.len(),
        damage_events,
        heal_events,
        status_events,
        participants: ids.len(),
        participant_stats,
        total_damage,
        total_healing,
        total_dps: total_damage as f64 / divisor,
        total_hps: total_healing as f64 / divisor,
    }
}
