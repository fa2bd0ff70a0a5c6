//! Bulk assignment from JSON (`settings = {...}` on a host record)
//!
//! Accepted shapes per key:
//! - `null` clears the setting
//! - `{"modifier": ..., "value": ...}` sets one pair; other fields are ignored
//! - `[{...}, {...}]` sets several pairs
//!
//! Anything else is an argument-shape error.

use crate::contract::{Entry, Replacement, SettingValue, SettingsError};
use serde_json::Value;

/// Split a JSON object into per-key replacements
pub fn replacements_from_json(values: &Value) -> Result<Vec<(String, Replacement)>, SettingsError> {
    let object = values.as_object().ok_or_else(|| SettingsError::ArgumentShape {
        key: "settings".to_string(),
        details: "An object of settings expected.".to_string(),
    })?;

    object
        .iter()
        .map(|(key, value)| Ok((key.clone(), replacement_from_json(key, value)?)))
        .collect()
}

pub fn replacement_from_json(key: &str, value: &Value) -> Result<Replacement, SettingsError> {
    match value {
        Value::Null => Ok(Replacement::Clear),
        Value::Object(_) => Ok(Replacement::One(entry_from_json(key, value)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => entry_from_json(key, item),
                _ => Err(shape(key, "A list of modifier/value objects expected.")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Replacement::Many),
        _ => Err(shape(key, "A modifier/value object expected.")),
    }
}

fn entry_from_json(key: &str, value: &Value) -> Result<Entry, SettingsError> {
    let modifier = match value.get("modifier") {
        None | Some(Value::Null) => None,
        Some(Value::String(m)) => Some(m.clone()),
        Some(_) => return Err(shape(key, "Modifiers must be strings.")),
    };

    let value = match value.get("value") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            SettingValue::from_json(v)
                .ok_or_else(|| shape(key, "Values must be strings, numbers or booleans."))?,
        ),
    };

    Ok(Entry { modifier, value })
}

fn shape(key: &str, details: &str) -> SettingsError {
    SettingsError::ArgumentShape {
        key: key.to_string(),
        details: details.to_string(),
    }
}
