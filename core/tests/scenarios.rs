//! End-to-end scenarios: definitions on disk through ingest, stats and broadcast.

use std::fs;
use std::sync::Arc;
use std::thread;

use limitbreak_core::definitions::load_from_dirs;
use limitbreak_core::{
    AppConfig, CombatTracker, DefinitionError, EventKind, ManualClock, StatsResponse,
};
use serde_json::json;
use tempfile::TempDir;

const BLACK_MAGE: &str = r#"{
    "job": "black mage",
    "actions": [
        {"8D": "fire", "damage": [{"potency": 300}]},
        {"25": "transpose"}
    ],
    "statuseffects": [
        {"A1": "thunder", "timeproc": {"type": "dot", "potency": 45, "damagetype": "magic", "maxticks": 8}}
    ]
}"#;

const WHITE_MAGE: &str = r#"{
    "job": "white mage",
    "actions": [{"78": "cure", "heal": [{"potency": 500}]}]
}"#;

struct Fixture {
    _dirs: TempDir,
    tracker: CombatTracker,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let dirs = TempDir::new().unwrap();
    let definitions = dirs.path().join("definitions");
    let overrides = dirs.path().join("overrides");
    fs::create_dir_all(&definitions).unwrap();
    fs::create_dir_all(&overrides).unwrap();

    fs::write(definitions.join("BlackMage.json"), BLACK_MAGE).unwrap();
    fs::write(definitions.join("WhiteMage.json"), WHITE_MAGE).unwrap();
    fs::write(definitions.join("Broken.json"), r#"{"job": "bard", "actions": ["#).unwrap();
    fs::write(definitions.join("notes.md"), "not a definition").unwrap();
    // BOM-prefixed override file
    fs::write(
        overrides.join("00-names.txt"),
        "\u{feff}# display names\nfire|Fire\ncure|Cure\n\nno separator here\n",
    )
    .unwrap();

    let (registry, report) = load_from_dirs(Some(&definitions), Some(&overrides));
    assert_eq!(report.jobs_loaded, 2);
    assert_eq!(report.overrides_loaded, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], DefinitionError::Json { .. }));

    let clock = Arc::new(ManualClock::starting_now());
    let tracker = CombatTracker::new(registry, clock.clone(), &AppConfig::default());
    Fixture {
        _dirs: dirs,
        tracker,
        clock,
    }
}

#[test]
fn three_fire_casts_one_second_apart() {
    let f = fixture();
    for i in 0..3 {
        if i > 0 {
            f.clock.advance_secs(1);
        }
        f.tracker
            .ingest_damage(&json!({
                "source_id": "p1",
                "target_id": "e1",
                "action_id": "8d",
                "damage": 1000
            }))
            .unwrap();
    }

    let StatsResponse::One(stats) = f.tracker.stats(Some("p1")) else {
        panic!("expected single stats");
    };
    assert_eq!(stats.total_damage, 3000);
    assert_eq!(stats.hit_count, 3);
    assert_eq!(stats.dps, 1500.0);

    let latest = &f.tracker.recent_events(Some(EventKind::Damage), 1)[0];
    assert_eq!(latest.display_name(), "Fire");
}

#[test]
fn unknown_skill_is_recorded_with_placeholder() {
    let f = fixture();
    let event = f
        .tracker
        .ingest_damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "beef", "damage": 10}))
        .unwrap();
    assert_eq!(event.display_name(), "Unknown_BEEF");
    assert_eq!(f.tracker.status().current_events, 1);
}

#[test]
fn summary_covers_every_kind() {
    let f = fixture();
    f.tracker
        .ingest_damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "8D", "damage": 2000}))
        .unwrap();
    f.clock.advance_secs(2);
    f.tracker
        .ingest_heal(&json!({"source_id": "h1", "target_id": "p1", "action_id": "78", "heal_amount": 900, "overheal_amount": 100}))
        .unwrap();
    f.tracker
        .ingest_status(&json!({"target_id": "e1", "status_id": "a1", "duration": 24.0}))
        .unwrap();

    let summary = f.tracker.summary();
    assert_eq!(summary.total_events, 3);
    assert_eq!(summary.damage_events, 1);
    assert_eq!(summary.heal_events, 1);
    assert_eq!(summary.status_events, 1);
    assert_eq!(summary.participants, 3);
    assert_eq!(summary.duration_secs, 2.0);
    assert_eq!(summary.total_dps, 1000.0);
    assert_eq!(summary.total_hps, 450.0);

    let healing = f.tracker.healing("h1", None);
    assert_eq!(healing.total_overheal, 100);
    assert_eq!(healing.overheal_percent, 10.0);
}

#[test]
fn sawtooth_retention_through_the_tracker() {
    let f = fixture();
    for i in 0..15_002u64 {
        f.tracker
            .ingest_damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "8D", "damage": i}))
            .unwrap();
    }
    let events = f.tracker.recent_events(None, usize::MAX);
    assert_eq!(events.len(), 5_000);
    // Second eviction fires on the 15,002nd append and keeps #10,003 onwards
    // (damage is the zero-based append index)
    assert_eq!(events[4_999].as_damage().map(|d| d.damage), Some(10_002));
    assert_eq!(events[0].as_damage().map(|d| d.damage), Some(15_001));
}

#[tokio::test]
async fn subscribers_receive_events_in_order() {
    let f = fixture();
    let mut rx = f.tracker.subscribe();
    let dropped = f.tracker.subscribe();
    drop(dropped);

    for amount in [100, 200] {
        f.tracker
            .ingest_damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "8D", "damage": amount}))
            .unwrap();
    }

    assert_eq!(rx.recv().await.and_then(|e| e.as_damage().map(|d| d.damage)), Some(100));
    assert_eq!(rx.recv().await.and_then(|e| e.as_damage().map(|d| d.damage)), Some(200));
    assert_eq!(f.tracker.status().subscribers, 1);
}

#[test]
fn readers_see_consistent_snapshots_during_ingest() {
    let f = fixture();
    let tracker = Arc::new(f.tracker);

    let writer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for _ in 0..12_001 {
                tracker
                    .ingest_damage(&json!({"source_id": "p1", "target_id": "e1", "action_id": "8D", "damage": 1}))
                    .unwrap();
            }
        })
    };

    for _ in 0..200 {
        let summary = tracker.summary();
        assert!(summary.total_events <= 10_000);
        assert_eq!(summary.total_events, summary.damage_events);
        assert_eq!(summary.total_damage, summary.total_events as u64);
    }

    writer.join().unwrap();
    assert_eq!(tracker.status().current_events, 7_000);
}
