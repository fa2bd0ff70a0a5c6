//! Validation of modifier/value pairs against an option's rules

use super::coercion;
use super::schema::OptionDef;
use crate::contract::{Entry, SettingsError};

/// Default upper bound for a stored value, in bytes
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 65_535;

/// Limits applied on top of an option's own rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_value_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}

/// Check one entry and return every rule it breaks
pub fn entry_errors(option: &OptionDef, entry: &Entry, limits: &Limits) -> Vec<String> {
    let key = option.key();
    let mut errors = Vec::new();

    match entry.value.as_ref().filter(|value| !value.is_blank()) {
        None => {
            errors.push(format!("The value for the '{}' setting must be present.", key));
        }
        Some(value) => {
            if !option.permits_value(value) {
                errors.push(format!(
                    "The value '{}' for the '{}' setting isn't present in the list of allowed values.",
                    value, key
                ));
            }

            if let Some(format) = option.allowed_format() {
                if !coercion::conforms(value, format) {
                    errors.push(format!(
                        "The value '{}' for the '{}' setting is not {}.",
                        value,
                        key,
                        coercion::describe(format)
                    ));
                }
            }

            if value.to_storage().len() > limits.max_value_length {
                errors.push(format!(
                    "The value for the '{}' setting is longer than {} bytes.",
                    key, limits.max_value_length
                ));
            }
        }
    }

    if let Some(modifier) = &entry.modifier {
        if !option.permits_modifier(modifier) {
            errors.push(format!(
                "The modifier '{}' for the '{}' setting isn't present in the list of allowed modifiers.",
                modifier, key
            ));
        }
    }

    errors
}

/// Check every entry; all failures are reported together
pub fn validate_entries(
    option: &OptionDef,
    entries: &[Entry],
    limits: &Limits,
) -> Result<(), SettingsError> {
    let errors: Vec<String> = entries
        .iter()
        .flat_map(|entry| entry_errors(option, entry, limits))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SettingsError::Validation {
            key: option.key().to_string(),
            errors,
        })
    }
}
