//! Contract models for configurable settings
//!
//! These models are transport-agnostic and shared by the domain and storage layers.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Row identifier assigned by the store
pub type SettingId = i64;

/// Owner of a set of stored settings (owner kind + owner id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    /// Registered owner kind (e.g., "category")
    pub kind: String,
    /// Identifier of the owning record
    pub id: Uuid,
}

impl OwnerRef {
    pub fn new(kind: impl Into<String>, id: Uuid) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Typed in-memory setting value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl SettingValue {
    /// Equality under a format: integers and floats compare numerically.
    pub fn same_as(&self, other: &SettingValue) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                integral_f64_to_i64(*b) == Some(*a)
            }
            _ => self == other,
        }
    }

    /// Text representation written to the store
    pub fn to_storage(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Text that is empty or only whitespace counts as no value at all
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Scalar JSON value as a setting value; `None` for null, arrays and objects
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            _ => None,
        }
    }
}

/// Exact integer value of a float, if it has one within `i64` range
fn integral_f64_to_i64(f: f64) -> Option<i64> {
    // 2^63 is exact as f64; anything at or above it overflows i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage())
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// One modifier/value pair held by a setting proxy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub modifier: Option<String>,
    pub value: Option<SettingValue>,
}

impl Entry {
    /// Entry with a value and no modifier
    pub fn value(value: impl Into<SettingValue>) -> Self {
        Self {
            modifier: None,
            value: Some(value.into()),
        }
    }

    /// Entry with both a modifier and a value
    pub fn modified(modifier: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        Self {
            modifier: Some(modifier.into()),
            value: Some(value.into()),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.modifier.is_none() && self.value.is_none()
    }

    /// Order-insensitive comparison helper: same modifier and same value under format equality
    pub fn same_as(&self, other: &Entry) -> bool {
        self.modifier == other.modifier
            && match (&self.value, &other.value) {
                (Some(a), Some(b)) => a.same_as(b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Replacement for a proxy's pending state
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    /// Revert to the default (non-multiple) or remove every value (multiple)
    Clear,
    One(Entry),
    Many(Vec<Entry>),
}

impl From<Entry> for Replacement {
    fn from(entry: Entry) -> Self {
        Self::One(entry)
    }
}

impl From<Vec<Entry>> for Replacement {
    fn from(entries: Vec<Entry>) -> Self {
        Self::Many(entries)
    }
}

impl From<Option<Entry>> for Replacement {
    fn from(entry: Option<Entry>) -> Self {
        entry.map_or(Self::Clear, Self::One)
    }
}

/// Pending view of one setting
#[derive(Debug, Clone, PartialEq)]
pub enum SettingView {
    Single(Entry),
    Multiple(Vec<Entry>),
}

/// Persisted setting row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSetting {
    pub id: SettingId,
    pub owner: OwnerRef,
    pub key: String,
    pub modifier: Option<String>,
    /// Always text, whatever the option's logical type
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to be created by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSetting {
    pub key: String,
    pub modifier: Option<String>,
    pub value: String,
}
