pub mod broadcast;
pub mod clock;
pub mod combat_log;
pub mod config;
pub mod definitions;
pub mod event_log;
pub mod normalizer;
pub mod stats;
pub mod tracker;

// Re-exports for convenience
pub use broadcast::{Broadcaster, EventSubscriber, SubscriberError, SubscriberId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use combat_log::{CombatEvent, DamageEvent, EventKind, HealEvent, InvalidEvent, RawEvent, StatusEvent};
pub use config::{AppConfig, ConfigError};
pub use definitions::{DefinitionError, DefinitionRegistry, DefinitionSource, LoadReport};
pub use event_log::EventLog;
pub use normalizer::EventNormalizer;
pub use stats::StatsEngine;
pub use tracker::CombatTracker;
pub use limitbreak_types::{
    CombatantStats, EncounterSummary, HealingStats, StatsResponse, TrackerStatus,
};
