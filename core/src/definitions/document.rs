//! Job definition documents
//!
//! One JSON document describes one job:
//!
//! ```json
//! {
//!   "job": "black mage",
//!   "actions": [
//!     {"8D": "fire", "damage": [{"potency": 300}]},
//!     {"9A": "transpose"}
//!   ],
//!   "statuseffects": [
//!     {"A1": "thunder", "timeproc": {"type": "dot", "potency": 45, "damagetype": "magic", "maxticks": 8}}
//!   ]
//! }
//! ```
//!
//! Inside an entry, every key that is not a known sibling (`damage`/`heal` for
//! actions, `timeproc` for status effects) is an identifier whose string value
//! is the display name. Sibling data applies to every identifier in the entry.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::DefinitionError;
use super::definition::{EffectKind, PotencyEntry, SkillDefinition, StatusDefinition};

const DAMAGE_KEY: &str = "damage";
const HEAL_KEY: &str = "heal";
const TIMEPROC_KEY: &str = "timeproc";

/// A parsed job document, before it is merged into a registry.
#[derive(Debug, Clone, Default)]
pub struct JobDocument {
    pub job: String,
    pub skills: Vec<SkillDefinition>,
    pub statuses: Vec<StatusDefinition>,
}

/// `timeproc` descriptor on a status entry. Missing fields fall back to
/// the same defaults as a bare entry.
#[derive(Debug, Default, Deserialize)]
struct TimeProc {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    potency: i64,
    #[serde(default)]
    maxticks: u32,
    #[serde(default)]
    damagetype: Option<String>,
}

/// Parse a single job document.
///
/// `origin` names the document in errors (usually its file name). When the
/// document has no `job` field, `origin` is also used as the job name.
pub fn parse_document(origin: &str, text: &str) -> Result<JobDocument, DefinitionError> {
    let root: Value = serde_json::from_str(text).map_err(|source| DefinitionError::Json {
        origin: origin.to_string(),
        source,
    })?;
    let schema = |reason: String| DefinitionError::Schema {
        origin: origin.to_string(),
        reason,
    };

    let Value::Object(root) = root else {
        return Err(schema("document root must be an object".into()));
    };

    let job = match root.get("job") {
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => origin.to_string(),
        Some(_) => return Err(schema("'job' must be a string".into())),
    };

    let mut skills = Vec::new();
    for (idx, entry) in entries(&root, "actions").map_err(&schema)?.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or_else(|| schema(format!("actions[{idx}] must be an object")))?;
        let parsed = parse_skill_entry(entry).map_err(|e| schema(format!("actions[{idx}]: {e}")))?;
        skills.extend(parsed);
    }

    let mut statuses = Vec::new();
    for (idx, entry) in entries(&root, "statuseffects").map_err(&schema)?.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or_else(|| schema(format!("statuseffects[{idx}] must be an object")))?;
        let parsed =
            parse_status_entry(entry).map_err(|e| schema(format!("statuseffects[{idx}]: {e}")))?;
        statuses.extend(parsed);
    }

    Ok(JobDocument {
        job,
        skills,
        statuses,
    })
}

/// Get an optional array field. Absent or null means empty.
fn entries<'a>(root: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], String> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(format!("'{key}' must be an array")),
    }
}

/// Collect `id -> name` pairs from an entry, skipping the sibling keys.
fn identifiers<'a>(
    entry: &'a Map<String, Value>,
    siblings: &[&str],
) -> Result<Vec<(&'a str, &'a str)>, String> {
    let mut ids = Vec::new();
    for (key, value) in entry {
        if siblings.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::String(name) => ids.push((key.as_str(), name.as_str())),
            _ => return Err(format!("name for '{key}' must be a string")),
        }
    }
    if ids.is_empty() {
        return Err("entry has no identifier".into());
    }
    Ok(ids)
}

fn potency_list(entry: &Map<String, Value>, key: &str) -> Result<Vec<PotencyEntry>, String> {
    match entry.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| format!("'{key}' must be a list of potency objects ({e})")),
    }
}

fn parse_skill_entry(entry: &Map<String, Value>) -> Result<Vec<SkillDefinition>, String> {
    let damage = potency_list(entry, DAMAGE_KEY)?;
    let heal = potency_list(entry, HEAL_KEY)?;

    Ok(identifiers(entry, &[DAMAGE_KEY, HEAL_KEY])?
        .into_iter()
        .map(|(id, name)| SkillDefinition {
            id: id.to_string(),
            name: name.to_string(),
            damage_potency: damage.clone(),
            heal_potency: heal.clone(),
        })
        .collect())
}

fn parse_status_entry(entry: &Map<String, Value>) -> Result<Vec<StatusDefinition>, String> {
    let timeproc = match entry.get(TIMEPROC_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<TimeProc>(value.clone())
                .map_err(|e| format!("malformed 'timeproc' ({e})"))?,
        ),
    };

    Ok(identifiers(entry, &[TIMEPROC_KEY])?
        .into_iter()
        .map(|(id, name)| match &timeproc {
            None => StatusDefinition::named(id, name),
            Some(tp) => StatusDefinition {
                id: id.to_string(),
                name: name.to_string(),
                effect_kind: tp.kind.as_deref().map(EffectKind::from).unwrap_or_default(),
                potency: tp.potency,
                duration_ticks: tp.maxticks,
                damage_type: tp.damagetype.clone(),
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK_MAGE: &str = r#"{
        "job": "black mage",
        "actions": [
            {"8D": "fire", "damage": [{"potency": 300}]},
            {"9A": "transpose"}
        ],
        "statuseffects": [
            {"A1": "thunder", "timeproc": {"type": "dot", "potency": 45, "damagetype": "magic", "maxticks": 8}},
            {"2D3": "triplecast"}
        ]
    }"#;

    #[test]
    fn test_parse_both_skill_encodings() {
        let doc = parse_document("BlackMage.json", BLACK_MAGE).unwrap();
        assert_eq!(doc.job, "black mage");
        assert_eq!(doc.skills.len(), 2);

        let fire = &doc.skills[0];
        assert_eq!(fire.id, "8D");
        assert_eq!(fire.name, "fire");
        assert_eq!(fire.damage_potency.len(), 1);
        assert_eq!(fire.damage_potency[0].potency, 300);
        assert!(fire.heal_potency.is_empty());

        assert_eq!(doc.skills[1], SkillDefinition::named("9A", "transpose"));
    }

    #[test]
    fn test_parse_status_with_and_without_timeproc() {
        let doc = parse_document("BlackMage.json", BLACK_MAGE).unwrap();
        assert_eq!(doc.statuses.len(), 2);

        let thunder = &doc.statuses[0];
        assert_eq!(thunder.id, "A1");
        assert_eq!(thunder.name, "thunder");
        assert_eq!(thunder.effect_kind, EffectKind::Dot);
        assert_eq!(thunder.potency, 45);
        assert_eq!(thunder.duration_ticks, 8);
        assert_eq!(thunder.damage_type.as_deref(), Some("magic"));

        assert_eq!(doc.statuses[1], StatusDefinition::named("2D3", "triplecast"));
    }

    #[test]
    fn test_missing_job_uses_origin() {
        let doc = parse_document("Chocobo", r#"{"actions": []}"#).unwrap();
        assert_eq!(doc.job, "Chocobo");
        assert!(doc.skills.is_empty());
        assert!(doc.statuses.is_empty());
    }

    #[test]
    fn test_partial_timeproc_defaults() {
        let doc = parse_document(
            "x",
            r#"{"job": "sage", "statuseffects": [{"A38": "eukrasian dosis", "timeproc": {"potency": 70}}]}"#,
        )
        .unwrap();
        let status = &doc.statuses[0];
        assert_eq!(status.effect_kind, EffectKind::Unknown);
        assert_eq!(status.potency, 70);
        assert_eq!(status.duration_ticks, 0);
        assert_eq!(status.damage_type, None);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = parse_document("Broken.json", r#"{"job": "bard", "actions": [,]}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::Json { ref origin, .. } if origin == "Broken.json"));
    }

    #[test]
    fn test_schema_errors() {
        let err = parse_document("a", r#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(err, DefinitionError::Schema { .. }));

        let err = parse_document("b", r#"{"job": "x", "actions": [{"damage": [{"potency": 1}]}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no identifier"));

        let err = parse_document("c", r#"{"job": "x", "actions": [{"8D": 12}]}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        let err = parse_document("d", r#"{"job": "x", "actions": [{"8D": "fire", "damage": 300}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("'damage'"));
    }
}
