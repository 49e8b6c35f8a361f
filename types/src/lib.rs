//! Result types shared between the tracker core and its consumers.
//!
//! Everything here is plain data: derived per query, serializable, and owned
//! by whoever asked for it.

pub mod formatting;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default trailing window for live statistics, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Event Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Discriminant of a combat event, used for filtering recent-event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Damage,
    Heal,
    Status,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Damage => "damage",
            EventKind::Heal => "heal",
            EventKind::Status => "status",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "damage" => Ok(EventKind::Damage),
            "heal" => Ok(EventKind::Heal),
            "status" => Ok(EventKind::Status),
            other => Err(format!("unknown event kind '{other}'")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Combatant Metrics
// ─────────────────────────────────────────────────────────────────────────────

/// Damage metrics for one combatant over a trailing window.
///
/// Rates are percentages in `0.0..=100.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantStats {
    pub combatant_id: String,
    pub total_damage: u64,
    pub dps: f64,
    pub hit_count: u32,
    pub critical_hits: u32,
    pub critical_rate: f64,
    pub direct_hits: u32,
    pub direct_hit_rate: f64,
}

impl CombatantStats {
    /// All-zero stats, returned when a combatant dealt no damage in the window.
    pub fn empty(combatant_id: impl Into<String>) -> Self {
        Self {
            combatant_id: combatant_id.into(),
            total_damage: 0,
            dps: 0.0,
            hit_count: 0,
            critical_hits: 0,
            critical_rate: 0.0,
            direct_hits: 0,
            direct_hit_rate: 0.0,
        }
    }
}

/// Healing metrics for one combatant over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingStats {
    pub combatant_id: String,
    pub total_healing: u64,
    pub total_overheal: u64,
    pub hps: f64,
    /// Overheal as a share of all healing output (effective + overheal)
    pub overheal_percent: f64,
    pub heal_count: u32,
    pub critical_heals: u32,
    pub critical_rate: f64,
}

impl HealingStats {
    pub fn empty(combatant_id: impl Into<String>) -> Self {
        Self {
            combatant_id: combatant_id.into(),
            total_healing: 0,
            total_overheal: 0,
            hps: 0.0,
            overheal_percent: 0.0,
            heal_count: 0,
            critical_heals: 0,
            critical_rate: 0.0,
        }
    }
}

/// Either one combatant's stats or everyone's, depending on the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    One(CombatantStats),
    Many(Vec<CombatantStats>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounter Summary
// ─────────────────────────────────────────────────────────────────────────────

/// Whole-log summary across every retained event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_secs: f64,
    pub total_events: usize,
    pub damage_events: usize,
    pub heal_events: usize,
    pub status_events: usize,
    /// Distinct source and target identifiers seen in the log
    pub participants: usize,
    pub participant_stats: BTreeMap<String, CombatantStats>,
    pub total_damage: u64,
    pub total_healing: u64,
    pub total_dps: f64,
    pub total_hps: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracker Status
// ─────────────────────────────────────────────────────────────────────────────

/// Counts describing what the tracker has loaded and is holding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStatus {
    pub jobs_loaded: usize,
    pub skills_loaded: usize,
    pub statuses_loaded: usize,
    pub overrides_loaded: usize,
    pub current_events: usize,
    pub subscribers: usize,
}
