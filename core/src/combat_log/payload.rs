//! Raw producer payloads and field extraction.
//!
//! Producers hand over untyped JSON objects that are already split by kind.
//! [`Payload`] reads fields out of them with explicit defaults; anything it
//! cannot read becomes an [`InvalidEvent`] instead of a silently defaulted value.

use serde_json::{Map, Value};
use thiserror::Error;

use super::EventKind;

/// An already-demultiplexed payload from the producer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Damage(Value),
    Heal(Value),
    Status(Value),
}

impl RawEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        match kind {
            EventKind::Damage => RawEvent::Damage(payload),
            EventKind::Heal => RawEvent::Heal(payload),
            EventKind::Status => RawEvent::Status(payload),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Damage(_) => EventKind::Damage,
            RawEvent::Heal(_) => EventKind::Heal,
            RawEvent::Status(_) => EventKind::Status,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            RawEvent::Damage(v) | RawEvent::Heal(v) | RawEvent::Status(v) => v,
        }
    }
}

/// Why a payload could not be normalized. Invalid payloads never reach the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEvent {
    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Read-only view over a payload object.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
    pub fn new(value: &'a Value) -> Result<Self, InvalidEvent> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or(InvalidEvent::NotAnObject)
    }

    /// Null and absent are the same thing to every reader below.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Required identifier. Strings are trimmed; numbers are rendered as decimal text.
    pub fn identifier(&self, field: &'static str) -> Result<String, InvalidEvent> {
        self.optional_text(field)?
            .ok_or(InvalidEvent::MissingField(field))
    }

    /// Optional text field. Empty strings count as absent.
    pub fn optional_text(&self, field: &'static str) -> Result<Option<String>, InvalidEvent> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let s = s.trim();
                Ok((!s.is_empty()).then(|| s.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(InvalidEvent::WrongType {
                field,
                expected: "a string or number",
            }),
        }
    }

    /// Non-negative amount. Floats are truncated, negatives clamp to 0.
    pub fn amount(&self, field: &'static str, default: u64) -> Result<u64, InvalidEvent> {
        match self.get(field) {
            None => Ok(default),
            Some(Value::Number(n)) => Ok(n
                .as_u64()
                .or_else(|| n.as_i64().map(|v| v.max(0) as u64))
                .or_else(|| n.as_f64().map(|v| v.max(0.0) as u64))
                .unwrap_or(default)),
            Some(_) => Err(InvalidEvent::WrongType {
                field,
                expected: "a number",
            }),
        }
    }

    pub fn count(&self, field: &'static str, default: u32) -> Result<u32, InvalidEvent> {
        let value = self.amount(field, u64::from(default))?;
        Ok(u32::try_from(value).unwrap_or(u32::MAX))
    }

    pub fn seconds(&self, field: &'static str, default: f64) -> Result<f64, InvalidEvent> {
        match self.get(field) {
            None => Ok(default),
            Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(default).max(0.0)),
            Some(_) => Err(InvalidEvent::WrongType {
                field,
                expected: "a number",
            }),
        }
    }

    pub fn flag(&self, field: &'static str, default: bool) -> Result<bool, InvalidEvent> {
        match self.get(field) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(InvalidEvent::WrongType {
                field,
                expected: "a boolean",
            }),
        }
    }
}
