//! Random combat traffic for exercising the tracker without a game client.
//!
//! Four players fight two enemies. Each tick every player attacks with 70%
//! probability; otherwise the healer heals a random party member.

use limitbreak_core::RawEvent;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

struct Combatant {
    id: &'static str,
    name: &'static str,
    actions: &'static [&'static str],
    healer: bool,
}

static PARTY: [Combatant; 4] = [
    Combatant {
        id: "tank_001",
        name: "Paladin",
        actions: &["1F", "25"],
        healer: false,
    },
    Combatant {
        id: "healer_001",
        name: "Sage",
        actions: &["5EDC", "5EDE"],
        healer: true,
    },
    Combatant {
        id: "dps_001",
        name: "Black Mage",
        actions: &["8D", "8E"],
        healer: false,
    },
    Combatant {
        id: "dps_002",
        name: "Red Mage",
        actions: &["1D50", "5EDB"],
        healer: false,
    },
];

static ENEMIES: [(&str, &str); 2] = [("boss_001", "Stone Guardian"), ("add_001", "Stone Soldier")];

const ATTACK_CHANCE: f64 = 0.7;
const CRIT_CHANCE: f64 = 0.25;
const DIRECT_HIT_CHANCE: f64 = 0.25;

pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// One round: an event per party member that acts.
    pub fn tick(&mut self) -> Vec<RawEvent> {
        let mut events = Vec::with_capacity(PARTY.len());
        for member in &PARTY {
            if self.rng.gen_bool(ATTACK_CHANCE) {
                events.push(self.attack(member));
            } else if member.healer {
                events.push(self.heal(member));
            }
        }
        events
    }

    /// Exactly `count` events, generated round by round.
    pub fn generate(&mut self, count: usize) -> Vec<RawEvent> {
        let mut events = Vec::with_capacity(count + PARTY.len());
        while events.len() < count {
            events.extend(self.tick());
        }
        events.truncate(count);
        events
    }

    fn action(&mut self, member: &Combatant) -> &'static str {
        member.actions.choose(&mut self.rng).copied().unwrap_or("0")
    }

    fn attack(&mut self, member: &Combatant) -> RawEvent {
        let (target_id, target_name) = ENEMIES[self.rng.gen_range(0..ENEMIES.len())];
        RawEvent::Damage(json!({
            "source_id": member.id,
            "source_name": member.name,
            "target_id": target_id,
            "target_name": target_name,
            "action_id": self.action(member),
            "damage": self.rng.gen_range(800..=2500),
            "is_critical": self.rng.gen_bool(CRIT_CHANCE),
            "is_direct_hit": self.rng.gen_bool(DIRECT_HIT_CHANCE),
        }))
    }

    fn heal(&mut self, member: &Combatant) -> RawEvent {
        let target = &PARTY[self.rng.gen_range(0..PARTY.len())];
        RawEvent::Heal(json!({
            "source_id": member.id,
            "source_name": member.name,
            "target_id": target.id,
            "target_name": target.name,
            "action_id": self.action(member),
            "heal_amount": self.rng.gen_range(600..=1200),
            "overheal_amount": self.rng.gen_range(0..=200),
        }))
    }
}
