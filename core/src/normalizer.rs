//! Event normalization
//!
//! Turns raw producer payloads into [`CombatEvent`]s. Every kind follows the
//! same steps:
//!
//! 1. Uppercase the action/status identifier
//! 2. Resolve it against the registry, or build an `Unknown_<ID>` placeholder
//! 3. Apply the override rules to the resolved (or placeholder) name
//! 4. Stamp with the normalizer's clock
//! 5. Copy the remaining fields, filling gaps with defaults
//!
//! A payload missing a required identifier yields [`InvalidEvent`]; it is up
//! to the caller to drop it.

use std::sync::Arc;

use crate::clock::Clock;
use crate::combat_log::{
    CombatEvent, DEFAULT_DAMAGE_TYPE, DamageEvent, HealEvent, InvalidEvent, Payload, RawEvent,
    StatusEvent,
};
use crate::definitions::{DefinitionRegistry, normalize_id};

const DEFAULT_STACK_COUNT: u32 = 1;

/// Placeholder name for an identifier the registry doesn't know.
pub fn unknown_name(id: &str) -> String {
    format!("Unknown_{id}")
}

pub struct EventNormalizer {
    registry: Arc<DefinitionRegistry>,
    clock: Arc<dyn Clock>,
}

impl EventNormalizer {
    pub fn new(registry: Arc<DefinitionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    pub fn normalize(&self, raw: &RawEvent) -> Result<CombatEvent, InvalidEvent> {
        match raw {
            RawEvent::Damage(payload) => self.damage(payload),
            RawEvent::Heal(payload) => self.heal(payload),
            RawEvent::Status(payload) => self.status(payload),
        }
    }

    pub fn damage(&self, payload: &serde_json::Value) -> Result<CombatEvent, InvalidEvent> {
        let p = Payload::new(payload)?;
        let action_id = normalize_id(&p.identifier("action_id")?);
        let action_name = self.skill_name(&action_id);

        Ok(CombatEvent::Damage(DamageEvent {
            timestamp: self.clock.now(),
            source_id: p.identifier("source_id")?,
            source_name: p.optional_text("source_name")?,
            target_id: p.identifier("target_id")?,
            target_name: p.optional_text("target_name")?,
            action_id,
            action_name,
            damage: p.amount("damage", 0)?,
            damage_type: p
                .optional_text("damage_type")?
                .unwrap_or_else(|| DEFAULT_DAMAGE_TYPE.to_string()),
            is_critical: p.flag("is_critical", false)?,
            is_direct_hit: p.flag("is_direct_hit", false)?,
            is_blocked: p.flag("is_blocked", false)?,
            block_amount: p.amount("block_amount", 0)?,
        }))
    }

    pub fn heal(&self, payload: &serde_json::Value) -> Result<CombatEvent, InvalidEvent> {
        let p = Payload::new(payload)?;
        let action_id = normalize_id(&p.identifier("action_id")?);
        let action_name = self.skill_name(&action_id);

        Ok(CombatEvent::Heal(HealEvent {
            timestamp: self.clock.now(),
            source_id: p.identifier("source_id")?,
            source_name: p.optional_text("source_name")?,
            target_id: p.identifier("target_id")?,
            target_name: p.optional_text("target_name")?,
            action_id,
            action_name,
            heal_amount: p.amount("heal_amount", 0)?,
            overheal_amount: p.amount("overheal_amount", 0)?,
            is_critical: p.flag("is_critical", false)?,
        }))
    }

    pub fn status(&self, payload: &serde_json::Value) -> Result<CombatEvent, InvalidEvent> {
        let p = Payload::new(payload)?;
        let status_id = normalize_id(&p.identifier("status_id")?);
        let status_name = self.status_name(&status_id);

        Ok(CombatEvent::Status(StatusEvent {
            timestamp: self.clock.now(),
            target_id: p.identifier("target_id")?,
            target_name: p.optional_text("target_name")?,
            status_id,
            status_name,
            stack_count: p.count("stack_count", DEFAULT_STACK_COUNT)?,
            duration: p.seconds("duration", 0.0)?,
            is_applied: p.flag("is_applied", true)?,
        }))
    }

    fn skill_name(&self, action_id: &str) -> String {
        let name = match self.registry.resolve_skill(action_id) {
            Some(skill) => skill.name.clone(),
            None => unknown_name(action_id),
        };
        self.registry.apply_override(&name)
    }

    fn status_name(&self, status_id: &str) -> String {
        let name = match self.registry.resolve_status(status_id) {
            Some(status) => status.name.clone(),
            None => unknown_name(status_id),
        };
        self.registry.apply_override(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::definitions::DefinitionSource;
    use serde_json::json;

    const BLACK_MAGE: &str = r#"{
        "job": "black mage",
        "actions": [{"8D": "fire", "damage": [{"potency": 300}]}],
        "statuseffects": [{"A1": "thunder", "timeproc": {"type": "dot", "potency": 45, "maxticks": 8}}]
    }"#;

    fn make_normalizer(overrides: Vec<(&str, &str)>) -> (EventNormalizer, Arc<ManualClock>) {
        let (registry, _) =
            DefinitionRegistry::load(vec![DefinitionSource::new("BlackMage", BLACK_MAGE)], overrides);
        let clock = Arc::new(ManualClock::starting_now());
        (EventNormalizer::new(Arc::new(registry), clock.clone()), clock)
    }

    #[test]
    fn damage_resolves_name_and_copies_fields() {
        let (normalizer, clock) = make_normalizer(vec![]);
        let event = normalizer
            .damage(&json!({
                "source_id": "p1",
                "target_id": "e1",
                "action_id": "8d",
                "damage": 1200,
                "is_critical": true
            }))
            .unwrap();

        let CombatEvent::Damage(dmg) = event else {
            panic!("expected damage event");
        };
        assert_eq!(dmg.timestamp, clock.now());
        assert_eq!(dmg.action_id, "8D");
        assert_eq!(dmg.action_name, "fire");
        assert_eq!(dmg.damage, 1200);
        assert!(dmg.is_critical);
        assert!(!dmg.is_direct_hit);
        assert!(!dmg.is_blocked);
        assert_eq!(dmg.block_amount, 0);
        assert_eq!(dmg.damage_type, "physical");
        assert_eq!(dmg.source_name, None);
    }

    #[test]
    fn override_applies_to_resolved_name() {
        let (normalizer, _) = make_normalizer(vec![("fire", "Fire")]);
        let event = normalizer
            .damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "8D", "damage": 1}))
            .unwrap();
        assert_eq!(event.display_name(), "Fire");
    }

    #[test]
    fn unknown_action_gets_placeholder() {
        let (normalizer, _) = make_normalizer(vec![]);
        let event = normalizer
            .heal(&json!({"source_id": "p2", "target_id": "p1", "action_id": "abc", "heal_amount": 800}))
            .unwrap();
        let heal = event.as_heal().unwrap();
        assert_eq!(heal.action_id, "ABC");
        assert_eq!(heal.action_name, "Unknown_ABC");
        assert_eq!(heal.overheal_amount, 0);
        assert!(!heal.is_critical);
    }

    #[test]
    fn override_applies_to_placeholder() {
        let (normalizer, _) = make_normalizer(vec![("Unknown_", "???")]);
        let event = normalizer
            .status(&json!({"target_id": "e1", "status_id": "ffff"}))
            .unwrap();
        assert_eq!(event.display_name(), "???");
    }

    #[test]
    fn status_defaults() {
        let (normalizer, _) = make_normalizer(vec![]);
        let event = normalizer
            .status(&json!({"target_id": "e1", "target_name": "Training Dummy", "status_id": "a1"}))
            .unwrap();
        let status = event.as_status().unwrap();
        assert_eq!(status.status_name, "thunder");
        assert_eq!(status.stack_count, 1);
        assert_eq!(status.duration, 0.0);
        assert!(status.is_applied);
        assert_eq!(status.target_name.as_deref(), Some("Training Dummy"));
        assert_eq!(event.source_id(), None);
    }

    #[test]
    fn client_timestamp_is_ignored() {
        let (normalizer, clock) = make_normalizer(vec![]);
        let event = normalizer
            .damage(&json!({
                "source_id": "p1", "target_id": "e1", "action_id": "8D",
                "timestamp": "1999-01-01T00:00:00"
            }))
            .unwrap();
        assert_eq!(event.timestamp(), clock.now());
    }

    #[test]
    fn missing_identifiers_are_invalid() {
        let (normalizer, _) = make_normalizer(vec![]);
        assert_eq!(
            normalizer.damage(&json!({"target_id": "e1", "action_id": "8D"})),
            Err(InvalidEvent::MissingField("source_id"))
        );
        assert_eq!(
            normalizer.heal(&json!({"source_id": "p1", "target_id": "e1"})),
            Err(InvalidEvent::MissingField("action_id"))
        );
        assert_eq!(
            normalizer.status(&json!({"status_id": "A1"})),
            Err(InvalidEvent::MissingField("target_id"))
        );
        assert_eq!(normalizer.damage(&json!("8D")), Err(InvalidEvent::NotAnObject));
    }

    #[test]
    fn normalize_dispatches_on_kind() {
        let (normalizer, _) = make_normalizer(vec![]);
        let raw = RawEvent::Status(json!({"target_id": "e1", "status_id": "A1", "is_applied": false}));
        let event = normalizer.normalize(&raw).unwrap();
        assert_eq!(event.kind(), raw.kind());
        assert!(!event.as_status().unwrap().is_applied);
    }
}
