//! Versioned envelope for the persisted meeting collection.
//!
//! # Responsibility
//! - Serialize store state as `{ "state": { "meetings": [...] }, "version": N }`.
//! - Upgrade older envelopes through an ordered migration chain on load.
//!
//! # Invariants
//! - Encoding always writes `ENVELOPE_VERSION`.
//! - A missing `version` field is read as version 0 (the legacy browser blob).
//! - Envelopes newer than `ENVELOPE_VERSION` are rejected, never guessed at.

use crate::model::meeting::Meeting;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default namespace key for the meeting collection slot.
pub const STORAGE_KEY: &str = "minutes-pro-storage";

/// Version written by this build.
pub const ENVELOPE_VERSION: u32 = 1;

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[derive(Debug)]
pub enum EnvelopeError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u64, latest: u32 },
    Malformed(String),
}

impl Display for EnvelopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid persisted state json: {err}"),
            Self::UnsupportedVersion { found, latest } => write!(
                f,
                "persisted state version {found} is newer than supported {latest}"
            ),
            Self::Malformed(message) => write!(f, "malformed persisted state: {message}"),
        }
    }
}

impl Error for EnvelopeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// The durable part of store state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a PersistedState,
    version: u32,
}

/// One upgrade step producing state at `version` from `version - 1`.
#[derive(Clone, Copy)]
struct StateMigration {
    version: u32,
    apply: fn(&mut Value) -> EnvelopeResult<()>,
}

const MIGRATIONS: &[StateMigration] = &[StateMigration {
    version: 1,
    apply: collapse_attendee_fields,
}];

/// Serializes state into the current envelope format.
pub fn encode(state: &PersistedState) -> EnvelopeResult<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        state,
        version: ENVELOPE_VERSION,
    })?)
}

/// Parses an envelope of any supported version into current state.
pub fn decode(raw: &str) -> EnvelopeResult<PersistedState> {
    let mut envelope: Value = serde_json::from_str(raw)?;
    let Some(root) = envelope.as_object_mut() else {
        return Err(EnvelopeError::Malformed(
            "envelope is not a json object".to_string(),
        ));
    };

    let found = match root.get("version") {
        None | Some(Value::Null) => 0,
        Some(value) => value.as_u64().ok_or_else(|| {
            EnvelopeError::Malformed(format!("version `{value}` is not a non-negative integer"))
        })?,
    };
    if found > u64::from(ENVELOPE_VERSION) {
        return Err(EnvelopeError::UnsupportedVersion {
            found,
            latest: ENVELOPE_VERSION,
        });
    }

    let mut state = root
        .remove("state")
        .unwrap_or_else(|| Value::Object(Map::new()));
    for migration in MIGRATIONS
        .iter()
        .filter(|m| u64::from(m.version) > found)
    {
        (migration.apply)(&mut state)?;
        info!(
            "event=envelope_migrate module=storage status=ok to_version={}",
            migration.version
        );
    }

    Ok(serde_json::from_value(state)?)
}

/// v0 -> v1: keep only the typed attendee text.
///
/// v0 records carried both `attendees` (array) and `attendeesString`.
/// The string wins when present; otherwise the array is joined.
fn collapse_attendee_fields(state: &mut Value) -> EnvelopeResult<()> {
    let Some(meetings) = state.get_mut("meetings") else {
        return Ok(());
    };
    let Some(meetings) = meetings.as_array_mut() else {
        return Err(EnvelopeError::Malformed(
            "`meetings` is not an array".to_string(),
        ));
    };

    for meeting in meetings {
        let Some(record) = meeting.as_object_mut() else {
            return Err(EnvelopeError::Malformed(
                "meeting entry is not an object".to_string(),
            ));
        };
        let typed = record
            .remove("attendeesString")
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|text| !text.trim().is_empty());
        let listed = record.remove("attendees").and_then(|value| {
            value.as_array().map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
        });
        let text = typed.or(listed).unwrap_or_default();
        record.insert("attendeesText".to_string(), Value::String(text));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, PersistedState, ENVELOPE_VERSION};

    #[test]
    fn encode_writes_current_version() {
        let raw = encode(&PersistedState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], ENVELOPE_VERSION);
        assert!(value["state"]["meetings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_object_decodes_to_empty_state() {
        assert_eq!(decode("{}").unwrap(), PersistedState::default());
    }
}
