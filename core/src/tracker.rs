//! Combat tracker facade
//!
//! Ties the registry, normalizer, event log, statistics engine and
//! broadcaster together behind the query interface external transports use.
//!
//! ```text
//!  RawEvent ──► EventNormalizer ──► EventLog ──► Broadcaster ──► subscribers
//!                    │                  │
//!            DefinitionRegistry    StatsEngine ◄── queries
//! ```
//!
//! Ingest is the single writer. Concurrent callers are serialized so stamps
//! stay in append order. Queries read snapshots and may run concurrently
//! with it.

use std::sync::{Arc, Mutex, PoisonError};

use limitbreak_types::{
    CombatantStats, EncounterSummary, EventKind, HealingStats, StatsResponse, TrackerStatus,
};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::broadcast::{Broadcaster, EventSubscriber, SubscriberId};
use crate::clock::{Clock, SystemClock};
use crate::combat_log::{CombatEvent, InvalidEvent, RawEvent};
use crate::config::AppConfig;
use crate::definitions::{
    DefinitionRegistry, JobDefinition, LoadReport, SkillDefinition, StatusDefinition,
    load_from_dirs,
};
use crate::event_log::EventLog;
use crate::normalizer::EventNormalizer;
use crate::stats::StatsEngine;

pub struct CombatTracker {
    registry: Arc<DefinitionRegistry>,
    normalizer: EventNormalizer,
    log: Arc<EventLog>,
    stats: StatsEngine,
    broadcaster: Broadcaster,
    ingest_lock: Mutex<()>,
    search_limit: usize,
    search_min_chars: usize,
}

impl CombatTracker {
    pub fn new(registry: DefinitionRegistry, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        let registry = Arc::new(registry);
        let log = Arc::new(EventLog::with_limits(config.log_capacity, config.log_retain));
        Self {
            normalizer: EventNormalizer::new(Arc::clone(&registry), Arc::clone(&clock)),
            stats: StatsEngine::new(Arc::clone(&log), clock, config.default_window_secs),
            registry,
            log,
            broadcaster: Broadcaster::new(),
            ingest_lock: Mutex::new(()),
            search_limit: config.search_limit,
            search_min_chars: config.search_min_chars,
        }
    }

    /// Load definitions from the configured directories and start with an
    /// empty log on the system clock.
    pub fn from_config(config: &AppConfig) -> (Self, LoadReport) {
        let (registry, report) =
            load_from_dirs(config.definitions_dir.as_deref(), config.overrides_dir.as_deref());
        let tracker = Self::new(registry, Arc::new(SystemClock::new()), config);
        (tracker, report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingest
    // ─────────────────────────────────────────────────────────────────────────

    /// Normalize, append and broadcast one payload.
    ///
    /// Invalid payloads are logged and dropped; they never reach the log.
    /// Stamping, appending and publishing happen under one lock, so the log
    /// and every subscriber see events in timestamp order.
    pub fn ingest(&self, raw: &RawEvent) -> Result<Arc<CombatEvent>, InvalidEvent> {
        let _guard = self.ingest_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let event = match self.normalizer.normalize(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(kind = %raw.kind(), error = %e, "Dropping invalid combat event");
                return Err(e);
            }
        };
        let event = self.log.append(event);
        self.broadcaster.publish(&event);
        Ok(event)
    }

    pub fn ingest_damage(&self, payload: &Value) -> Result<Arc<CombatEvent>, InvalidEvent> {
        self.ingest(&RawEvent::Damage(payload.clone()))
    }

    pub fn ingest_heal(&self, payload: &Value) -> Result<Arc<CombatEvent>, InvalidEvent> {
        self.ingest(&RawEvent::Heal(payload.clone()))
    }

    pub fn ingest_status(&self, payload: &Value) -> Result<Arc<CombatEvent>, InvalidEvent> {
        self.ingest(&RawEvent::Status(payload.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// One combatant's stats, or everyone's when `combatant_id` is `None`,
    /// over the default window.
    pub fn stats(&self, combatant_id: Option<&str>) -> StatsResponse {
        self.stats_window(combatant_id, self.stats.default_window())
    }

    pub fn stats_window(&self, combatant_id: Option<&str>, window_secs: u64) -> StatsResponse {
        match combatant_id {
            Some(id) => StatsResponse::One(self.stats.windowed_stats(id, window_secs)),
            None => StatsResponse::Many(self.stats.all_stats(window_secs)),
        }
    }

    pub fn combatant_stats(&self, combatant_id: &str, window_secs: u64) -> CombatantStats {
        self.stats.windowed_stats(combatant_id, window_secs)
    }

    pub fn healing(&self, combatant_id: &str, window_secs: Option<u64>) -> HealingStats {
        let window = window_secs.unwrap_or(self.stats.default_window());
        self.stats.windowed_healing(combatant_id, window)
    }

    /// Newest first, optionally restricted to one kind.
    pub fn recent_events(&self, kind: Option<EventKind>, limit: usize) -> Vec<Arc<CombatEvent>> {
        self.log
            .recent(limit, |e| kind.is_none_or(|k| e.kind() == k))
    }

    pub fn summary(&self) -> EncounterSummary {
        self.stats.encounter_summary()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry pass-through
    // ─────────────────────────────────────────────────────────────────────────

    pub fn resolve_skill(&self, id: &str) -> Option<&SkillDefinition> {
        self.registry.resolve_skill(id)
    }

    pub fn resolve_status(&self, id: &str) -> Option<&StatusDefinition> {
        self.registry.resolve_status(id)
    }

    /// Skills whose name contains `keyword`. Keywords shorter than the
    /// configured minimum return nothing; results are capped.
    pub fn search_skills(&self, keyword: &str) -> Vec<&SkillDefinition> {
        let keyword = keyword.trim();
        if keyword.chars().count() < self.search_min_chars {
            return Vec::new();
        }
        let mut found = self.registry.search_skills(keyword);
        found.truncate(self.search_limit);
        found
    }

    pub fn jobs(&self) -> Vec<String> {
        self.registry.list_jobs()
    }

    pub fn job_definition(&self, name: &str) -> Option<&JobDefinition> {
        self.registry.job_definition(name)
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscribers
    // ─────────────────────────────────────────────────────────────────────────

    /// Receive every event appended from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<CombatEvent>> {
        self.broadcaster.subscribe_channel().1
    }

    pub fn add_subscriber(&self, subscriber: Box<dyn EventSubscriber>) -> SubscriberId {
        self.broadcaster.add(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.broadcaster.remove(id)
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            jobs_loaded: self.registry.job_count(),
            skills_loaded: self.registry.skill_count(),
            statuses_loaded: self.registry.status_count(),
            overrides_loaded: self.registry.override_count(),
            current_events: self.log.len(),
            subscribers: self.broadcaster.len(),
        }
    }
}
