//! Save and load: structural serialization, template rehydration, and the
//! versioned transport envelope.
//!
//! # Format
//!
//! A save is `{version, timestamp, state}` serialized to JSON and encoded
//! with standard base64 so it survives copy and paste. Quantities inside
//! `state` are decimal strings, so `33.333333333333333333` round-trips
//! exactly.
//!
//! # Rehydration
//!
//! JSON alone cannot say which strings are quantities, so loading never
//! deserializes the persisted document directly. Instead it serializes a
//! freshly constructed default [`GameState`] as a template and merges the
//! persisted document onto it:
//!
//! - objects merge key by key; keys missing from the save keep the
//!   template's value
//! - keys only in the save are carried over when they name an entry of an
//!   enum-keyed map (a resource, building, job, class, or mortality
//!   cause) and dropped otherwise
//! - arrays and primitives are taken from the save when their JSON kind
//!   matches the template's
//! - a number where the template holds a decimal string is accepted
//! - any other kind mismatch keeps the template's value
//!
//! The merged document is then deserialized into typed state. Every step
//! is fallible and nothing is swapped in until all of them succeed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kindling_types::{BuildingKind, Job, MortalityCause, ResourceKind, SocialClass};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::GameState;

/// Version written into every save. Imports require an exact match.
pub const SAVE_VERSION: u32 = 1;

/// Errors that can occur when exporting or importing a save.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The transport text is not valid base64.
    #[error("save text is not valid base64: {source}")]
    Decode {
        /// The underlying decode error.
        #[from]
        source: base64::DecodeError,
    },

    /// The decoded bytes are not UTF-8.
    #[error("save text is not valid UTF-8: {source}")]
    Utf8 {
        /// The underlying conversion error.
        #[from]
        source: std::string::FromUtf8Error,
    },

    /// The document is not valid JSON.
    #[error("save document is not valid JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A required envelope field is absent or has the wrong type.
    #[error("save envelope is missing field `{0}`")]
    MissingField(&'static str),

    /// The save was written by a different format version.
    #[error("save version {found} does not match expected version {expected}")]
    VersionMismatch {
        /// Version this build reads.
        expected: u32,
        /// Version found in the save.
        found: u64,
    },

    /// The merged document does not describe a valid game state.
    #[error("save state could not be restored: {reason}")]
    Rehydrate {
        /// Why typed deserialization failed.
        reason: String,
    },
}

/// The versioned save document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    /// Format version.
    pub version: u32,
    /// Wall-clock time of the export, in epoch milliseconds.
    pub timestamp: i64,
    /// Structural snapshot of the game state.
    pub state: Value,
}

/// A successfully decoded save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSave {
    /// The restored state.
    pub state: GameState,
    /// Export time, in epoch milliseconds.
    pub timestamp: i64,
}

/// Walk the state tree into a plain structural document.
///
/// # Errors
///
/// Returns [`SaveError::Json`] if a value cannot be represented as JSON.
pub fn serialize(state: &GameState) -> Result<Value, SaveError> {
    Ok(serde_json::to_value(state)?)
}

/// Merge `persisted` onto `template` following the rules in the module
/// documentation.
pub fn merge(template: &Value, persisted: &Value) -> Value {
    match (template, persisted) {
        (Value::Object(base), Value::Object(saved)) => {
            let mut merged = base.clone();
            for (key, value) in saved {
                match base.get(key) {
                    Some(default) => {
                        merged.insert(key.clone(), merge(default, value));
                    }
                    None if is_map_key(key) => {
                        merged.insert(key.clone(), value.clone());
                    }
                    None => {}
                }
            }
            Value::Object(merged)
        }
        (Value::String(default), Value::Number(number)) if default.parse::<Decimal>().is_ok() => {
            Value::String(number.to_string())
        }
        (Value::Null, _)
        | (Value::Array(_), Value::Array(_))
        | (Value::String(_), Value::String(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_)) => persisted.clone(),
        _ => template.clone(),
    }
}

/// Whether `key` names an entry of one of the enum-keyed maps in the
/// state tree.
fn is_map_key(key: &str) -> bool {
    let key = Value::String(key.to_owned());
    ResourceKind::deserialize(&key).is_ok()
        || BuildingKind::deserialize(&key).is_ok()
        || Job::deserialize(&key).is_ok()
        || SocialClass::deserialize(&key).is_ok()
        || MortalityCause::deserialize(&key).is_ok()
}

/// Rebuild typed state from a persisted document.
///
/// # Errors
///
/// Returns [`SaveError::Json`] if the template cannot be serialized, or
/// [`SaveError::Rehydrate`] if the merged document is not a valid state.
pub fn rehydrate(persisted: &Value, template: &GameState) -> Result<GameState, SaveError> {
    let base = serialize(template)?;
    let merged = merge(&base, persisted);
    serde_json::from_value(merged).map_err(|e| SaveError::Rehydrate {
        reason: e.to_string(),
    })
}

/// Encode a state as transport text.
///
/// # Errors
///
/// Returns [`SaveError::Json`] if serialization fails.
pub fn export(state: &GameState, timestamp: i64) -> Result<String, SaveError> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        timestamp,
        state: serialize(state)?,
    };
    let json = serde_json::to_string(&envelope)?;
    Ok(STANDARD.encode(json))
}

/// Decode transport text into a state, using `template` for rehydration.
///
/// # Errors
///
/// Fails on bad base64, bad UTF-8, bad JSON, missing envelope fields, a
/// version mismatch, or a state that cannot be rehydrated.
pub fn import(text: &str, template: &GameState) -> Result<LoadedSave, SaveError> {
    let bytes = STANDARD.decode(text.trim())?;
    let json = String::from_utf8(bytes)?;
    let document: Value = serde_json::from_str(&json)?;

    let version = document
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(SaveError::MissingField("version"))?;
    let timestamp = document
        .get("timestamp")
        .and_then(Value::as_i64)
        .ok_or(SaveError::MissingField("timestamp"))?;
    let persisted = document
        .get("state")
        .filter(|state| state.is_object())
        .ok_or(SaveError::MissingField("state"))?;

    if version != u64::from(SAVE_VERSION) {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: version,
        });
    }

    let state = rehydrate(persisted, template)?;
    Ok(LoadedSave { state, timestamp })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kindling_types::Era;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn encode(document: &Value) -> String {
        STANDARD.encode(document.to_string())
    }

    #[test]
    fn export_import_round_trip_is_exact() {
        let mut state = GameState::default();
        state.resources.set(ResourceKind::Food, dec!(33.333333333333333333));
        let settlers = state.settlers();
        state.workforce.assign_job(Job::Gatherer, 2, settlers);
        state.calendar.advance(dec!(12.35));
        state.tick = 247;

        let text = export(&state, 1_700_000_000_000).unwrap();
        let loaded = import(&text, &GameState::default()).unwrap();
        assert_eq!(loaded.timestamp, 1_700_000_000_000);
        assert_eq!(loaded.state, state);
        assert_eq!(
            loaded.state.resources.amount(ResourceKind::Food).to_string(),
            "33.333333333333333333"
        );
    }

    #[test]
    fn missing_fields_fall_back_to_template() {
        let template = GameState::default();
        let persisted = json!({
            "tick": 12,
            "future_field": { "anything": true },
        });
        let state = rehydrate(&persisted, &template).unwrap();
        assert_eq!(state.tick, 12);
        assert_eq!(state.resources, template.resources);
        assert_eq!(state.bonfire, template.bonfire);
    }

    #[test]
    fn numbers_are_accepted_for_quantities() {
        let template = GameState::default();
        let persisted = json!({ "bonfire": { "fuel": 42 } });
        let state = rehydrate(&persisted, &template).unwrap();
        assert_eq!(state.bonfire.fuel(), dec!(42));
    }

    #[test]
    fn mismatched_kinds_keep_the_template() {
        let template = GameState::default();
        let persisted = json!({ "tick": "soon", "running": 1 });
        let state = rehydrate(&persisted, &template).unwrap();
        assert_eq!(state.tick, template.tick);
        assert_eq!(state.running, template.running);
    }

    #[test]
    fn numbers_in_enum_fields_keep_the_template() {
        let template = GameState::default();
        let persisted = json!({ "era": 1, "tick": 5 });
        let state = rehydrate(&persisted, &template).unwrap();
        assert_eq!(state.era, Era::Tribal);
        assert_eq!(state.tick, 5);
    }

    #[test]
    fn unknown_map_keys_are_dropped() {
        let template = GameState::default();
        let persisted = json!({ "buildings": { "counts": { "Hut": 1, "Castle": 1 } } });
        let state = rehydrate(&persisted, &template).unwrap();
        assert_eq!(state.buildings.count(BuildingKind::Hut), 1);
        assert_eq!(state.buildings.counts().len(), 1);
    }

    #[test]
    fn rejects_bad_transport() {
        let template = GameState::default();
        assert!(matches!(import("***", &template), Err(SaveError::Decode { .. })));
        let not_utf8 = STANDARD.encode([0xff_u8, 0xfe, 0xfd]);
        assert!(matches!(import(&not_utf8, &template), Err(SaveError::Utf8 { .. })));
        let not_json = STANDARD.encode("{ nope");
        assert!(matches!(import(&not_json, &template), Err(SaveError::Json { .. })));
    }

    #[test]
    fn rejects_incomplete_envelopes() {
        let template = GameState::default();
        let no_version = encode(&json!({ "timestamp": 1, "state": {} }));
        assert!(matches!(
            import(&no_version, &template),
            Err(SaveError::MissingField("version"))
        ));
        let no_state = encode(&json!({ "version": SAVE_VERSION, "timestamp": 1 }));
        assert!(matches!(
            import(&no_state, &template),
            Err(SaveError::MissingField("state"))
        ));
    }

    #[test]
    fn rejects_other_versions() {
        let template = GameState::default();
        let future = encode(&json!({ "version": 2, "timestamp": 1, "state": {} }));
        assert!(matches!(
            import(&future, &template),
            Err(SaveError::VersionMismatch { expected: 1, found: 2 })
        ));
    }
}
