//! Lifecycle hooks for configurable records
//!
//! A host calls [`validate_settings`] before saving the record itself and
//! [`persist_settings`] after the record was saved. Failures are reported
//! through [`Configurable::report_error`] under [`SETTINGS_ERROR_CATEGORY`].

use crate::contract::{Configurable, SettingsError, SETTINGS_ERROR_CATEGORY};

/// Validate every modified setting of the record. Returns `false` and reports
/// each message when a rule is broken.
pub fn validate_settings<C>(record: &mut C) -> bool
where
    C: Configurable + ?Sized,
{
    let settings = record.settings();
    if settings.validate_all() {
        return true;
    }

    let errors = settings.errors().to_vec();
    report(record, errors);
    false
}

/// Save every modified setting of the record. Returns `false` and reports
/// each message when a save failed.
pub async fn persist_settings<C>(record: &mut C) -> bool
where
    C: Configurable + ?Sized,
{
    let settings = record.settings();
    if settings.save_all().await {
        return true;
    }

    let errors = settings.errors().to_vec();
    tracing::warn!(owner = %record.owner(), errors = errors.len(), "Settings not persisted");
    report(record, errors);
    false
}

/// Bulk assignment (`record.settings = {...}`). Returns the ignored keys;
/// structurally wrong input is an error.
pub async fn assign_settings<C>(
    record: &mut C,
    values: &serde_json::Value,
) -> Result<Vec<String>, SettingsError>
where
    C: Configurable + ?Sized,
{
    record.settings().assign_json(values).await
}

fn report<C>(record: &mut C, errors: Vec<String>)
where
    C: Configurable + ?Sized,
{
    for message in errors {
        record.report_error(SETTINGS_ERROR_CATEGORY, message);
    }
}
