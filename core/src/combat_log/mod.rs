//! Normalized combat events
//!
//! A [`CombatEvent`] is produced by the normalizer from a raw payload and is
//! immutable afterwards. Every field is populated; payload gaps are filled
//! with defaults at normalization time.

mod payload;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use limitbreak_types::EventKind;
pub use payload::{InvalidEvent, Payload, RawEvent};

/// Damage type used when the payload does not name one.
pub const DEFAULT_DAMAGE_TYPE: &str = "physical";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub timestamp: NaiveDateTime,
    pub source_id: String,
    pub source_name: Option<String>,
    pub target_id: String,
    pub target_name: Option<String>,
    pub action_id: String,
    pub action_name: String,
    pub damage: u64,
    pub damage_type: String,
    pub is_critical: bool,
    pub is_direct_hit: bool,
    pub is_blocked: bool,
    pub block_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealEvent {
    pub timestamp: NaiveDateTime,
    pub source_id: String,
    pub source_name: Option<String>,
    pub target_id: String,
    pub target_name: Option<String>,
    pub action_id: String,
    pub action_name: String,
    pub heal_amount: u64,
    pub overheal_amount: u64,
    pub is_critical: bool,
}

/// A status effect gained or lost. Statuses carry no source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub timestamp: NaiveDateTime,
    pub target_id: String,
    pub target_name: Option<String>,
    pub status_id: String,
    pub status_name: String,
    pub stack_count: u32,
    /// Remaining duration in seconds as reported by the producer
    pub duration: f64,
    /// True when applied, false when removed
    pub is_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    Damage(DamageEvent),
    Heal(HealEvent),
    Status(StatusEvent),
}

impl CombatEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CombatEvent::Damage(_) => EventKind::Damage,
            CombatEvent::Heal(_) => EventKind::Heal,
            CombatEvent::Status(_) => EventKind::Status,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            CombatEvent::Damage(e) => e.timestamp,
            CombatEvent::Heal(e) => e.timestamp,
            CombatEvent::Status(e) => e.timestamp,
        }
    }

    pub fn source_id(&self) -> Option<&str> {
        match self {
            CombatEvent::Damage(e) => Some(&e.source_id),
            CombatEvent::Heal(e) => Some(&e.source_id),
            CombatEvent::Status(_) => None,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            CombatEvent::Damage(e) => &e.target_id,
            CombatEvent::Heal(e) => &e.target_id,
            CombatEvent::Status(e) => &e.target_id,
        }
    }

    /// Action ID for damage/heal, status ID for status events.
    pub fn action_id(&self) -> &str {
        match self {
            CombatEvent::Damage(e) => &e.action_id,
            CombatEvent::Heal(e) => &e.action_id,
            CombatEvent::Status(e) => &e.status_id,
        }
    }

    /// Resolved (and overridden) display name.
    pub fn display_name(&self) -> &str {
        match self {
            CombatEvent::Damage(e) => &e.action_name,
            CombatEvent::Heal(e) => &e.action_name,
            CombatEvent::Status(e) => &e.status_name,
        }
    }

    pub fn as_damage(&self) -> Option<&DamageEvent> {
        match self {
            CombatEvent::Damage(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_heal(&self) -> Option<&HealEvent> {
        match self {
            CombatEvent::Heal(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_status(&self) -> Option<&StatusEvent> {
        match self {
            CombatEvent::Status(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn accessors_cover_every_variant() {
        let status = CombatEvent::Status(StatusEvent {
            timestamp: at("2025-01-01 20:00:00"),
            target_id: "e1".into(),
            target_name: None,
            status_id: "A1".into(),
            status_name: "thunder".into(),
            stack_count: 1,
            duration: 24.0,
            is_applied: true,
        });
        assert_eq!(status.kind(), EventKind::Status);
        assert_eq!(status.source_id(), None);
        assert_eq!(status.target_id(), "e1");
        assert_eq!(status.action_id(), "A1");
        assert_eq!(status.display_name(), "thunder");
        assert!(status.as_status().is_some());
        assert!(status.as_damage().is_none());
    }

    #[test]
    fn serializes_with_type_tag() {
        let heal = CombatEvent::Heal(HealEvent {
            timestamp: at("2025-01-01 20:00:00"),
            source_id: "p2".into(),
            source_name: Some("White Mage".into()),
            target_id: "p1".into(),
            target_name: None,
            action_id: "78".into(),
            action_name: "cure".into(),
            heal_amount: 900,
            overheal_amount: 100,
            is_critical: false,
        });
        let json = serde_json::to_value(&heal).unwrap();
        assert_eq!(json["type"], "heal");
        assert_eq!(json["heal_amount"], 900);

        let back: CombatEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, heal);
    }
}
