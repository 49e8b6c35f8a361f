//! Skill and status definition types
//!
//! Definitions are immutable once loaded. Identifiers are stored as written
//! in the source document; lookups go through [`normalize_id`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalize an identifier for lookup. Every key is uppercased on insert and on query.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// One potency row attached to a skill (e.g. `{"potency": 300}`).
///
/// Potency is opaque metadata here; any extra keys the document carries
/// (combo conditions, positional bonuses, ...) are preserved untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PotencyEntry {
    #[serde(default)]
    pub potency: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A job skill resolved from a definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub damage_potency: Vec<PotencyEntry>,
    pub heal_potency: Vec<PotencyEntry>,
}

impl SkillDefinition {
    /// Bare `{"8D": "fire"}` entry with no potency data.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            damage_potency: Vec::new(),
            heal_potency: Vec::new(),
        }
    }
}

/// What a status effect does each tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectKind {
    /// Damage over time
    Dot,
    /// Heal over time
    Hot,
    #[default]
    Unknown,
    /// Any other kind named by a document, kept verbatim (lowercased)
    Other(String),
}

impl EffectKind {
    pub fn as_str(&self) -> &str {
        match self {
            EffectKind::Dot => "dot",
            EffectKind::Hot => "hot",
            EffectKind::Unknown => "unknown",
            EffectKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for EffectKind {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dot" => EffectKind::Dot,
            "hot" => EffectKind::Hot,
            "" | "unknown" => EffectKind::Unknown,
            other => EffectKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EffectKind {
    fn from(value: String) -> Self {
        EffectKind::from(value.as_str())
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status effect resolved from a definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: String,
    pub name: String,
    pub effect_kind: EffectKind,
    pub potency: i64,
    /// Maximum number of ticks
    pub duration_ticks: u32,
    pub damage_type: Option<String>,
}

impl StatusDefinition {
    /// Bare `{"A1": "thunder"}` entry without a `timeproc` descriptor.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            effect_kind: EffectKind::Unknown,
            potency: 0,
            duration_ticks: 0,
            damage_type: None,
        }
    }
}

/// The skills and statuses contributed by one job document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    pub skill_ids: Vec<String>,
    pub status_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_uppercases_and_trims() {
        assert_eq!(normalize_id("8d"), "8D");
        assert_eq!(normalize_id(" 5edb "), "5EDB");
        assert_eq!(normalize_id("8D"), normalize_id("8d"));
    }

    #[test]
    fn effect_kind_round_trips_through_strings() {
        assert_eq!(EffectKind::from("DoT"), EffectKind::Dot);
        assert_eq!(EffectKind::from("hot"), EffectKind::Hot);
        assert_eq!(EffectKind::from(""), EffectKind::Unknown);
        assert_eq!(EffectKind::from("Shield"), EffectKind::Other("shield".into()));
        assert_eq!(String::from(EffectKind::Other("shield".into())), "shield");
    }

    #[test]
    fn potency_entry_keeps_extra_keys() {
        let entry: PotencyEntry =
            serde_json::from_value(serde_json::json!({"potency": 420, "combo": "1F"})).unwrap();
        assert_eq!(entry.potency, 420);
        assert_eq!(entry.extra.get("combo"), Some(&Value::from("1F")));
    }
}
