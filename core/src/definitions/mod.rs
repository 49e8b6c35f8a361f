//! Skill and status definitions
//!
//! This module provides:
//! - **Definitions**: Skill/status types resolved from job documents
//! - **Documents**: Parsing of the per-job JSON format
//! - **Overrides**: Ordered substring rules that rename display names
//! - **Registry**: The immutable lookup tables handed to the normalizer
//! - **Loader**: Reading documents and override files from disk
//!
//! # Architecture
//!
//! ```text
//!   Definitions/*.json        Overrides/*.txt
//!          │                        │
//!          ▼                        ▼
//!   parse_document()      parse_override_lines()
//!          │                        │
//!          └──────────┬─────────────┘
//!                     ▼
//!           DefinitionRegistry (Arc, read-only)
//!                     │
//!        resolve_skill / resolve_status / apply_override
//!                     ▼
//!              EventNormalizer
//! ```

mod definition;
mod document;
mod loader;
mod overrides;
mod registry;


use std::path::PathBuf;

use thiserror::Error;

pub use definition::{
    EffectKind, JobDefinition, PotencyEntry, SkillDefinition, StatusDefinition, normalize_id,
};
pub use document::{JobDocument, parse_document};
pub use loader::load_from_dirs;
pub use overrides::{NameOverrides, OverrideRule, parse_override_lines};
pub use registry::{DefinitionRegistry, DefinitionSource, LoadReport};

/// A definition document or override file that could not be loaded.
///
/// These never abort a load; they are collected in [`LoadReport::errors`].
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {origin} at line {}, column {}: {source}", .source.line(), .source.column())]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed definition document {origin}: {reason}")]
    Schema { origin: String, reason: String },
}
