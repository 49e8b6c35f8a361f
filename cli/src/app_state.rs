use limitbreak_core::definitions::{LoadReport, load_from_dirs};
use limitbreak_core::{AppConfig, CombatTracker, SystemClock};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct AppState {
    pub config: AppConfig,
    pub tracker: Arc<CombatTracker>,
    pub watcher_task: Option<JoinHandle<()>>,
}

impl AppState {
    pub fn new() -> Self {
        let config = AppConfig::load();
        let (tracker, report) = CombatTracker::from_config(&config);
        print_report(&report);
        Self {
            config,
            tracker: Arc::new(tracker),
            watcher_task: None,
        }
    }

    /// Rebuild the tracker from definition directories. The event log starts
    /// empty and any running watcher is stopped.
    pub fn reload(&mut self, definitions: Option<&Path>, overrides: Option<&Path>) -> LoadReport {
        let definitions = definitions.or(self.config.definitions_dir.as_deref());
        let overrides = overrides.or(self.config.overrides_dir.as_deref());
        let (registry, report) = load_from_dirs(definitions, overrides);

        if let Some(handle) = self.watcher_task.take() {
            handle.abort();
        }
        self.tracker = Arc::new(CombatTracker::new(
            registry,
            Arc::new(SystemClock::new()),
            &self.config,
        ));
        report
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_report(report: &LoadReport) {
    println!(
        "Loaded {} jobs ({} skills, {} statuses), {} overrides",
        report.jobs_loaded, report.skills_loaded, report.statuses_loaded, report.overrides_loaded
    );
    if !report.duplicates.is_empty() {
        println!("  {} duplicate IDs replaced: {}", report.duplicates.len(), report.duplicates.join(", "));
    }
    for error in &report.errors {
        println!("  skipped: {error}");
    }
}
