//! Declarative schema documents (YAML or JSON)
//!
//! ```yaml
//! owner: category
//! options:
//!   - key: sort
//!     default: alphabetical
//!     restrict: [alphabetical, manual]
//!   - key: price_filter
//!     format: float
//!     modifiers: [eq, lt, gt, lte, gte]
//!     multiple: true
//! ```
//!
//! Documents go through the same option builder as code declarations, in the
//! order default, format/pattern, restrict, modifiers, multiple.

use super::schema::{OptionBuilder, Schema};
use crate::contract::{SchemaError, SettingValue};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub owner: String,
    #[serde(default)]
    pub options: Vec<OptionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDocument {
    pub key: String,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub restrict: Option<Vec<Value>>,
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    /// Kept as a raw value so a non-boolean is reported as a declaration error
    #[serde(default, deserialize_with = "present")]
    pub multiple: Option<Value>,
}

/// Distinguish an explicit `null` (Some(Null)) from a missing field (None)
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SchemaDocument {
    pub fn from_yaml(source: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(source).map_err(|e| SchemaError::Document {
            details: e.to_string(),
        })
    }

    pub fn from_json(source: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(source).map_err(|e| SchemaError::Document {
            details: e.to_string(),
        })
    }

    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        let options = self.options;
        Schema::configure(self.owner, move |s| {
            for doc in options {
                s.option(doc.key.clone(), |o| apply(o, &doc))?;
            }
            Ok(())
        })
    }
}

fn apply(builder: &mut OptionBuilder, doc: &OptionDocument) -> Result<(), SchemaError> {
    if let Some(default) = &doc.default {
        if !default.is_null() {
            let value = scalar(&doc.key, default)?;
            builder.default(value)?;
        }
    }

    match (&doc.format, &doc.pattern) {
        (Some(_), Some(_)) => {
            return Err(SchemaError::Document {
                details: format!("`{}` declares both a format and a pattern", doc.key),
            });
        }
        (Some(format), None) => {
            builder.format(format)?;
        }
        (None, Some(pattern)) => {
            builder.pattern(pattern)?;
        }
        (None, None) => {}
    }

    if let Some(values) = &doc.restrict {
        let values = values
            .iter()
            .map(|v| scalar(&doc.key, v))
            .collect::<Result<Vec<_>, _>>()?;
        builder.restrict(values)?;
    }

    if let Some(modifiers) = &doc.modifiers {
        builder.modifiers(modifiers.iter().cloned())?;
    }

    if let Some(multiple) = &doc.multiple {
        let allow = multiple.as_bool().ok_or_else(|| SchemaError::MultipleNotBoolean {
            key: doc.key.clone(),
        })?;
        builder.multiple(allow)?;
    }

    Ok(())
}

fn scalar(key: &str, value: &Value) -> Result<SettingValue, SchemaError> {
    SettingValue::from_json(value).ok_or_else(|| SchemaError::UnsupportedValue {
        key: key.to_string(),
        details: format!("{} is not a string, number or boolean", value),
    })
}
