//! Loading definition documents and override files from disk
//!
//! Two directories are read:
//! - **Definitions**: one `*.json` job document per file
//! - **Overrides**: `*.txt` files of `pattern|replacement` lines
//!
//! Files are visited in sorted path order so override insertion order, and
//! therefore override matching, is the same on every machine.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;

use super::DefinitionError;
use super::overrides::parse_override_lines;
use super::registry::{DefinitionRegistry, DefinitionSource, LoadReport};

/// Load a registry from a definitions directory and an overrides directory.
///
/// Missing directories load as empty. Unreadable directories and files,
/// and documents that fail to parse, are recorded in the report and skipped.
pub fn load_from_dirs(
    definitions_dir: Option<&Path>,
    overrides_dir: Option<&Path>,
) -> (DefinitionRegistry, LoadReport) {
    let mut errors = Vec::new();

    let mut sources = Vec::new();
    if let Some(dir) = definitions_dir {
        for path in list_files(dir, "json", &mut errors) {
            match read_text(&path) {
                Ok(text) => sources.push(DefinitionSource::new(origin_of(&path), text)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read definition file");
                    errors.push(e);
                }
            }
        }
    }

    let mut overrides = Vec::new();
    if let Some(dir) = overrides_dir {
        for path in list_files(dir, "txt", &mut errors) {
            match read_text(&path) {
                Ok(text) => overrides.extend(parse_override_lines(&text)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read override file");
                    errors.push(e);
                }
            }
        }
    }

    let (registry, mut report) = DefinitionRegistry::load(sources, overrides);
    errors.append(&mut report.errors);
    report.errors = errors;
    (registry, report)
}

/// Files in `dir` with the given extension, sorted by path.
fn list_files(dir: &Path, extension: &str, errors: &mut Vec<DefinitionError>) -> Vec<PathBuf> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Definition directory does not exist, skipping");
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            let e = DefinitionError::Io {
                path: dir.to_path_buf(),
                source,
            };
            tracing::error!(error = %e, "Failed to list definition directory");
            errors.push(e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    paths.sort();
    paths
}

/// Read a file as UTF-8, dropping a leading BOM if present.
fn read_text(path: &Path) -> Result<String, DefinitionError> {
    let bytes = fs::read(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        tracing::warn!(path = %path.display(), "Replaced invalid UTF-8 sequences");
    }
    Ok(text.into_owned())
}

fn origin_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
