//! Contract error types for configurable settings

use thiserror::Error;

/// Malformed option or schema declaration.
///
/// Raised synchronously while a schema is being declared; the declaring call
/// produces no schema at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("The default value `{default}` for `{key}` isn't present in the list of allowed values.")]
    DefaultNotAllowed { key: String, default: String },

    #[error("The multiple option for `{key}` requires a boolean.")]
    MultipleNotBoolean { key: String },

    #[error("The option `{key}` can't have a default value and allow multiple values.")]
    DefaultWithMultiple { key: String },

    #[error("Unknown format `{format}` for `{key}`.")]
    UnknownFormat { key: String, format: String },

    #[error("Invalid pattern for `{key}`: {details}")]
    InvalidPattern { key: String, details: String },

    #[error("Unsupported value for `{key}`: {details}")]
    UnsupportedValue { key: String, details: String },

    #[error("The option `{key}` is declared more than once for `{owner_kind}`.")]
    DuplicateOption { owner_kind: String, key: String },

    #[error("A schema for `{owner_kind}` is already registered.")]
    DuplicateSchema { owner_kind: String },

    #[error("Invalid schema document: {details}")]
    Document { details: String },
}

/// Runtime settings errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// One or more entries failed the option's rules
    #[error("Validation failed for `{key}`: {}", errors.join(" "))]
    Validation { key: String, errors: Vec<String> },

    /// Structurally wrong argument (e.g. several values for a single-value option)
    #[error("Invalid argument for `{key}`: {details}")]
    ArgumentShape { key: String, details: String },

    /// The store could not complete a write
    #[error("Could not persist `{key}`: {reason}")]
    Persistence { key: String, reason: String },

    /// The store could not complete a read
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// No schema is registered for the owner kind
    #[error("Owner kind not registered: {owner_kind}")]
    UnknownOwnerKind { owner_kind: String },
}

impl SettingsError {
    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage {
            reason: format!("{:#}", err),
        }
    }
}
