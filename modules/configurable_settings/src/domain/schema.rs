//! Option declarations and per-owner-kind schemas
//!
//! A schema is declared once per owner kind:
//!
//! ```
//! use configurable_settings::domain::Schema;
//!
//! let schema = Schema::configure("category", |s| {
//!     s.option("sort", |o| {
//!         o.default("alphabetical")?.restrict(["alphabetical", "manual"])?;
//!         Ok(())
//!     })?;
//!     s.option("price_filter", |o| {
//!         o.format("float")?
//!             .modifiers(["eq", "lt", "gt", "lte", "gte"])?
//!             .multiple(true)?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(schema.contains("sort"));
//! ```
//!
//! Every builder statement re-validates the whole option, so a bad declaration
//! fails at the statement that introduced it and the `configure` call returns
//! no schema.

use crate::contract::{SchemaError, SettingValue};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Allowed format of an option's values
#[derive(Debug, Clone)]
pub enum Format {
    String,
    Integer,
    Float,
    Boolean,
    Email,
    Url,
    /// Text matched by a user-supplied regular expression
    Pattern(Regex),
}

impl Format {
    /// Parse a format name. A leading `:` (symbol shorthand) is ignored and
    /// `fixnum` is accepted as a legacy name for `integer`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches(':') {
            "string" => Some(Self::String),
            "integer" | "fixnum" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "boolean" => Some(Self::Boolean),
            "email" => Some(Self::Email),
            "url" => Some(Self::Url),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Email => "email",
            Self::Url => "url",
            Self::Pattern(_) => "pattern",
        }
    }
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            other => f.write_str(other.name()),
        }
    }
}

/// One declared configuration slot
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    key: String,
    default_value: Option<SettingValue>,
    allowed_format: Option<Format>,
    allowed_values: Option<Vec<SettingValue>>,
    allowed_modifiers: Option<Vec<String>>,
    allow_multiple: bool,
}

impl OptionDef {
    fn new(key: String) -> Self {
        Self {
            key,
            default_value: None,
            allowed_format: None,
            allowed_values: None,
            allowed_modifiers: None,
            allow_multiple: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> Option<&SettingValue> {
        self.default_value.as_ref()
    }

    pub fn allowed_format(&self) -> Option<&Format> {
        self.allowed_format.as_ref()
    }

    pub fn allowed_values(&self) -> Option<&[SettingValue]> {
        self.allowed_values.as_deref()
    }

    pub fn allowed_modifiers(&self) -> Option<&[String]> {
        self.allowed_modifiers.as_deref()
    }

    pub fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// Whether `value` is in the allowed set (always true without a restriction)
    pub fn permits_value(&self, value: &SettingValue) -> bool {
        self.allowed_values
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|v| v.same_as(value)))
    }

    /// Whether `modifier` is in the allowed set (always true without a restriction)
    pub fn permits_modifier(&self, modifier: &str) -> bool {
        self.allowed_modifiers
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|m| m == modifier))
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if let Some(default) = &self.default_value {
            if !self.permits_value(default) {
                return Err(SchemaError::DefaultNotAllowed {
                    key: self.key.clone(),
                    default: default.to_storage(),
                });
            }

            if self.allow_multiple {
                return Err(SchemaError::DefaultWithMultiple {
                    key: self.key.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Builder handed to an option's declaration block
#[derive(Debug)]
pub struct OptionBuilder {
    option: OptionDef,
}

impl OptionBuilder {
    fn new(key: String) -> Self {
        Self {
            option: OptionDef::new(key),
        }
    }

    pub fn key(&self) -> &str {
        &self.option.key
    }

    pub fn default(&mut self, value: impl Into<SettingValue>) -> Result<&mut Self, SchemaError> {
        self.option.default_value = Some(value.into());
        self.checked()
    }

    /// Named format (`string`, `integer`, `float`, `boolean`, `email`, `url`)
    pub fn format(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        let format = Format::parse(name).ok_or_else(|| SchemaError::UnknownFormat {
            key: self.option.key.clone(),
            format: name.to_string(),
        })?;
        self.set_format(format)
    }

    /// Pattern format compiled from `pattern`
    pub fn pattern(&mut self, pattern: &str) -> Result<&mut Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            key: self.option.key.clone(),
            details: e.to_string(),
        })?;
        self.set_format(Format::Pattern(regex))
    }

    pub fn set_format(&mut self, format: Format) -> Result<&mut Self, SchemaError> {
        self.option.allowed_format = Some(format);
        self.checked()
    }

    pub fn restrict<I, V>(&mut self, values: I) -> Result<&mut Self, SchemaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<SettingValue>,
    {
        self.option.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self.checked()
    }

    pub fn modifiers<I, S>(&mut self, modifiers: I) -> Result<&mut Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option.allowed_modifiers = Some(modifiers.into_iter().map(Into::into).collect());
        self.checked()
    }

    pub fn multiple(&mut self, allow: bool) -> Result<&mut Self, SchemaError> {
        self.option.allow_multiple = allow;
        self.checked()
    }

    fn checked(&mut self) -> Result<&mut Self, SchemaError> {
        self.option.validate()?;
        Ok(self)
    }

    fn finish(self) -> OptionDef {
        self.option
    }
}

/// Options declared for one owner kind
#[derive(Debug, Clone)]
pub struct Schema {
    owner_kind: String,
    options: HashMap<String, Arc<OptionDef>>,
}

impl Schema {
    /// Run a declaration block and build the schema, or fail on the first bad statement
    pub fn configure<F>(owner_kind: impl Into<String>, declare: F) -> Result<Self, SchemaError>
    where
        F: FnOnce(&mut SchemaBuilder) -> Result<(), SchemaError>,
    {
        let mut builder = SchemaBuilder::new(owner_kind);
        declare(&mut builder)?;
        Ok(builder.build())
    }

    pub fn owner_kind(&self) -> &str {
        &self.owner_kind
    }

    pub fn option(&self, key: &str) -> Option<&Arc<OptionDef>> {
        self.options.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Declared keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.options.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Accumulates option declarations for one owner kind
#[derive(Debug)]
pub struct SchemaBuilder {
    owner_kind: String,
    options: HashMap<String, Arc<OptionDef>>,
}

impl SchemaBuilder {
    pub fn new(owner_kind: impl Into<String>) -> Self {
        Self {
            owner_kind: owner_kind.into(),
            options: HashMap::new(),
        }
    }

    /// Declare one option. The option is only added when its whole block succeeds.
    pub fn option<F>(&mut self, key: impl Into<String>, declare: F) -> Result<&mut Self, SchemaError>
    where
        F: FnOnce(&mut OptionBuilder) -> Result<(), SchemaError>,
    {
        let key = key.into();
        if self.options.contains_key(&key) {
            return Err(SchemaError::DuplicateOption {
                owner_kind: self.owner_kind.clone(),
                key,
            });
        }

        let mut builder = OptionBuilder::new(key.clone());
        declare(&mut builder)?;
        self.options.insert(key, Arc::new(builder.finish()));
        Ok(self)
    }

    pub fn build(self) -> Schema {
        Schema {
            owner_kind: self.owner_kind,
            options: self.options,
        }
    }
}
