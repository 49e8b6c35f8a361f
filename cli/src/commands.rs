use crate::app_state::{AppState, print_report};
use crate::event_watcher::{self, describe};
use crate::simulate::Simulator;
use limitbreak_core::{CombatTracker, CombatantStats, EventKind, RawEvent, StatsResponse};
use limitbreak_types::formatting::{
    format_compact, format_duration, format_per_second, format_rate, format_thousands,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

async fn tracker(state: &Arc<RwLock<AppState>>) -> Arc<CombatTracker> {
    Arc::clone(&state.read().await.tracker)
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading & ingest
// ─────────────────────────────────────────────────────────────────────────────

pub async fn load(
    definitions: Option<&Path>,
    overrides: Option<&Path>,
    state: Arc<RwLock<AppState>>,
) {
    let report = {
        let mut s = state.write().await;
        s.reload(definitions, overrides)
    };
    print_report(&report);
}

pub async fn inject(kind: EventKind, json: &str, state: Arc<RwLock<AppState>>) {
    let payload: serde_json::Value = match serde_json::from_str(json) {
        Ok(payload) => payload,
        Err(e) => {
            println!("Invalid JSON: {e}");
            return;
        }
    };

    let tracker = tracker(&state).await;
    match tracker.ingest(&RawEvent::new(kind, payload)) {
        Ok(event) => println!("{}", describe(&event)),
        Err(e) => println!("Rejected {kind} event: {e}"),
    }
}

pub async fn simulate(count: usize, seed: Option<u64>, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let mut simulator = Simulator::new(seed);

    let mut accepted = 0;
    for raw in simulator.generate(count) {
        if tracker.ingest(&raw).is_ok() {
            accepted += 1;
        }
    }
    println!("Simulated {accepted} events");
}

pub async fn watch(state: Arc<RwLock<AppState>>) {
    let running = {
        let mut s = state.write().await;
        match s.watcher_task.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    };

    if running {
        println!("Stopped watching combat events");
        return;
    }

    let handle = event_watcher::start_watcher(Arc::clone(&state)).await;
    state.write().await.watcher_task = Some(handle);
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

fn print_stats_header() {
    println!(
        "{:<16} {:>10} {:>10} {:>6} {:>8} {:>8}",
        "Combatant", "Damage", "DPS", "Hits", "Crit", "DH"
    );
}

fn print_stats_row(stats: &CombatantStats) {
    println!(
        "{:<16} {:>10} {:>10} {:>6} {:>8} {:>8}",
        stats.combatant_id,
        format_compact(stats.total_damage),
        format_per_second(stats.dps),
        stats.hit_count,
        format_rate(stats.critical_rate),
        format_rate(stats.direct_hit_rate),
    );
}

pub async fn show_stats(
    combatant: Option<&str>,
    window: Option<u64>,
    state: Arc<RwLock<AppState>>,
) {
    let tracker = tracker(&state).await;
    let response = match window {
        Some(window) => tracker.stats_window(combatant, window),
        None => tracker.stats(combatant),
    };

    print_stats_header();
    match response {
        StatsResponse::One(stats) => print_stats_row(&stats),
        StatsResponse::Many(all) => {
            if all.is_empty() {
                println!("No combat data");
            }
            for stats in &all {
                print_stats_row(stats);
            }
        }
    }
}

pub async fn show_healing(combatant: &str, window: Option<u64>, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let stats = tracker.healing(combatant, window);
    println!("{}", stats.combatant_id);
    println!("  Healing:  {}", format_thousands(stats.total_healing));
    println!("  HPS:      {}", format_per_second(stats.hps));
    println!(
        "  Overheal: {} ({})",
        format_thousands(stats.total_overheal),
        format_rate(stats.overheal_percent)
    );
    println!("  Heals:    {} ({} crit)", stats.heal_count, format_rate(stats.critical_rate));
}

pub async fn show_events(kind: Option<EventKind>, limit: usize, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let events = tracker.recent_events(kind, limit);
    if events.is_empty() {
        println!("No events");
    }
    for event in &events {
        println!("{}", describe(event));
    }
}

pub async fn show_summary(state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let summary = tracker.summary();

    println!(
        "{} - {} ({})",
        summary.start_time.format("%H:%M:%S"),
        summary.end_time.format("%H:%M:%S"),
        format_duration(summary.duration_secs)
    );
    println!(
        "Events: {} ({} damage, {} heal, {} status)",
        summary.total_events, summary.damage_events, summary.heal_events, summary.status_events
    );
    println!(
        "Damage: {} ({} DPS)   Healing: {} ({} HPS)",
        format_compact(summary.total_damage),
        format_per_second(summary.total_dps),
        format_compact(summary.total_healing),
        format_per_second(summary.total_hps),
    );
    println!("Participants: {}", summary.participants);

    if summary.participant_stats.is_empty() {
        return;
    }
    let mut rows: Vec<&CombatantStats> = summary.participant_stats.values().collect();
    rows.sort_by(|a, b| b.total_damage.cmp(&a.total_damage));
    print_stats_header();
    for stats in rows {
        print_stats_row(stats);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Definitions
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_skill(id: &str, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    match tracker.resolve_skill(id) {
        Some(skill) => {
            println!("{} {}", skill.id, skill.name);
            for entry in &skill.damage_potency {
                println!("  damage potency {}", entry.potency);
            }
            for entry in &skill.heal_potency {
                println!("  heal potency {}", entry.potency);
            }
        }
        None => println!("Skill {id} not found"),
    }
}

pub async fn show_effect(id: &str, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    match tracker.resolve_status(id) {
        Some(status) => {
            println!("{} {} [{}]", status.id, status.name, status.effect_kind);
            if status.potency > 0 || status.duration_ticks > 0 {
                println!(
                    "  potency {} over {} ticks{}",
                    status.potency,
                    status.duration_ticks,
                    status
                        .damage_type
                        .as_deref()
                        .map(|t| format!(" ({t})"))
                        .unwrap_or_default()
                );
            }
        }
        None => println!("Status {id} not found"),
    }
}

pub async fn search(keyword: &str, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let found = tracker.search_skills(keyword);
    if found.is_empty() {
        println!("No skills matching '{keyword}'");
    }
    for skill in found {
        println!("{:<8} {}", skill.id, skill.name);
    }
}

pub async fn show_jobs(name: Option<&str>, state: Arc<RwLock<AppState>>) {
    let tracker = tracker(&state).await;
    let Some(name) = name else {
        for job in tracker.jobs() {
            println!("{job}");
        }
        return;
    };

    match tracker.job_definition(name) {
        Some(job) => {
            println!("{}", job.name);
            println!("  skills:   {}", job.skill_ids.join(", "));
            println!("  statuses: {}", job.status_ids.join(", "));
        }
        None => println!("Job {name} not found"),
    }
}

pub async fn show_info(state: Arc<RwLock<AppState>>) {
    let s = state.read().await;
    let status = s.tracker.status();
    println!("Jobs:        {}", status.jobs_loaded);
    println!("Skills:      {}", status.skills_loaded);
    println!("Statuses:    {}", status.statuses_loaded);
    println!("Overrides:   {}", status.overrides_loaded);
    println!("Events:      {}", status.current_events);
    println!("Subscribers: {}", status.subscribers);
    match &s.config.definitions_dir {
        Some(dir) => println!("Definitions: {}", dir.display()),
        None => println!("Definitions: (none)"),
    }
    match &s.config.overrides_dir {
        Some(dir) => println!("Overrides:   {}", dir.display()),
        None => println!("Overrides:   (none)"),
    }
}

pub fn exit() {
    println!("Exiting...");
}
