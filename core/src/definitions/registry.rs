//! Definition registry
//!
//! Immutable lookup tables built once at startup: skills and statuses keyed by
//! normalized identifier, the list of loaded jobs, and the name override rules.
//! The registry is shared behind an `Arc` by everything that resolves names.

use hashbrown::HashMap;

use super::DefinitionError;
use super::definition::{JobDefinition, SkillDefinition, StatusDefinition, normalize_id};
use super::document::{JobDocument, parse_document};
use super::overrides::NameOverrides;

/// A definition document handed to [`DefinitionRegistry::load`].
#[derive(Debug, Clone)]
pub struct DefinitionSource {
    /// Name used in errors and as the fallback job name (usually the file name)
    pub origin: String,
    pub text: String,
}

impl DefinitionSource {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// Outcome of a registry load. Failed documents are listed in `errors`;
/// everything else was loaded. Counts are distinct entries in the resulting
/// registry, so replaced jobs and duplicate IDs are counted once.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub jobs_loaded: usize,
    pub skills_loaded: usize,
    pub statuses_loaded: usize,
    pub overrides_loaded: usize,
    /// Normalized identifiers that replaced an earlier definition
    pub duplicates: Vec<String>,
    pub errors: Vec<DefinitionError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Skill/status lookup tables plus override rules.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    // Stored in load order so searches are deterministic; the maps index into them
    skills: Vec<SkillDefinition>,
    skill_index: HashMap<String, usize>,
    statuses: Vec<StatusDefinition>,
    status_index: HashMap<String, usize>,
    jobs: Vec<JobDefinition>,
    overrides: NameOverrides,
}

impl DefinitionRegistry {
    /// Empty registry: every lookup misses and no override applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definition documents and override rules.
    ///
    /// Documents that fail to parse are skipped and recorded in the report;
    /// loading always continues with the rest.
    pub fn load<S, O, P, R>(sources: S, overrides: O) -> (Self, LoadReport)
    where
        S: IntoIterator<Item = DefinitionSource>,
        O: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let mut registry = Self::new();
        let mut report = LoadReport::default();

        for source in sources {
            match parse_document(&source.origin, &source.text) {
                Ok(doc) => {
                    let duplicates = registry.add_document(doc);
                    if !duplicates.is_empty() {
                        tracing::warn!(
                            origin = %source.origin,
                            ?duplicates,
                            "Duplicate definition IDs replaced earlier entries"
                        );
                    }
                    report.duplicates.extend(duplicates);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Skipping definition document");
                    report.errors.push(e);
                }
            }
        }

        for (pattern, replacement) in overrides {
            registry.overrides.insert(pattern, replacement);
        }
        report.jobs_loaded = registry.job_count();
        report.skills_loaded = registry.skill_count();
        report.statuses_loaded = registry.status_count();
        report.overrides_loaded = registry.overrides.len();

        tracing::info!(
            jobs = report.jobs_loaded,
            skills = report.skills_loaded,
            statuses = report.statuses_loaded,
            overrides = report.overrides_loaded,
            errors = report.errors.len(),
            "Loaded definitions"
        );

        (registry, report)
    }

    /// Merge one parsed document. Returns normalized IDs that replaced an
    /// existing definition (last writer wins).
    pub fn add_document(&mut self, doc: JobDocument) -> Vec<String> {
        let mut duplicates = Vec::new();
        let mut job = JobDefinition {
            name: doc.job,
            ..Default::default()
        };

        for skill in doc.skills {
            let key = normalize_id(&skill.id);
            job.skill_ids.push(skill.id.clone());
            if insert_indexed(&mut self.skills, &mut self.skill_index, key.clone(), skill) {
                duplicates.push(key);
            }
        }

        for status in doc.statuses {
            let key = normalize_id(&status.id);
            job.status_ids.push(status.id.clone());
            if insert_indexed(&mut self.statuses, &mut self.status_index, key.clone(), status) {
                duplicates.push(key);
            }
        }

        // Same job name loaded twice: the later document replaces the earlier one
        match self.jobs.iter_mut().find(|j| j.name == job.name) {
            Some(existing) => *existing = job,
            None => self.jobs.push(job),
        }

        duplicates
    }

    /// Replace the override rules wholesale.
    pub fn with_overrides(mut self, overrides: NameOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    // ─── Lookups ────────────────────────────────────────────────────────────

    pub fn resolve_skill(&self, id: &str) -> Option<&SkillDefinition> {
        self.skill_index
            .get(&normalize_id(id))
            .map(|&idx| &self.skills[idx])
    }

    pub fn resolve_status(&self, id: &str) -> Option<&StatusDefinition> {
        self.status_index
            .get(&normalize_id(id))
            .map(|&idx| &self.statuses[idx])
    }

    /// Apply the first matching override rule to a display name.
    pub fn apply_override(&self, name: &str) -> String {
        self.overrides.apply(name)
    }

    /// Job names in load order.
    pub fn list_jobs(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.name.clone()).collect()
    }

    /// Look up a job by exact name, falling back to a case-insensitive match.
    pub fn job_definition(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs
            .iter()
            .find(|j| j.name == name)
            .or_else(|| self.jobs.iter().find(|j| j.name.eq_ignore_ascii_case(name)))
    }

    /// Skills whose display name contains `keyword`, case-insensitively, in load order.
    /// The result is unbounded; callers cap it.
    pub fn search_skills(&self, keyword: &str) -> Vec<&SkillDefinition> {
        let keyword = keyword.to_lowercase();
        self.skills
            .iter()
            .filter(|skill| skill.name.to_lowercase().contains(&keyword))
            .collect()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.statuses.iter()
    }

    pub fn overrides(&self) -> &NameOverrides {
        &self.overrides
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn status_count(&self) -> usize {
        self.statuses.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

/// Insert or replace in a load-ordered table. Returns true on replacement.
fn insert_indexed<T>(
    items: &mut Vec<T>,
    index: &mut HashMap<String, usize>,
    key: String,
    item: T,
) -> bool {
    match index.get(&key) {
        Some(&idx) => {
            items[idx] = item;
            true
        }
        None => {
            index.insert(key, items.len());
            items.push(item);
            false
        }
    }
}
