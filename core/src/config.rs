//! Persistent application settings (`confy`, TOML).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event_log::{LOG_CAPACITY, LOG_RETAIN};
use limitbreak_types::DEFAULT_WINDOW_SECS;

pub const APP_NAME: &str = "limitbreak";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to store config: {0}")]
    Store(#[from] confy::ConfyError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of per-job `*.json` definition documents
    pub definitions_dir: Option<PathBuf>,
    /// Directory of `*.txt` name override files
    pub overrides_dir: Option<PathBuf>,
    pub default_window_secs: u64,
    pub log_capacity: usize,
    pub log_retain: usize,
    pub search_limit: usize,
    pub search_min_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            definitions_dir: default_definitions_dir(),
            overrides_dir: default_overrides_dir(),
            default_window_secs: DEFAULT_WINDOW_SECS,
            log_capacity: LOG_CAPACITY,
            log_retain: LOG_RETAIN,
            search_limit: 50,
            search_min_chars: 2,
        }
    }
}

impl AppConfig {
    /// Load from the user config file. A missing file is created with
    /// defaults; an unreadable one falls back to defaults.
    pub fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn store(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }
}

fn default_definitions_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME).join("definitions"))
}

fn default_overrides_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME).join("overrides"))
}
