//! Host contract for configurable records
//!
//! A record that declared a schema implements this trait so the lifecycle
//! hooks in [`crate::host`] can validate and persist its pending settings.

use super::model::OwnerRef;
use crate::domain::SettingManager;

/// Error category under which setting failures are reported to the host
pub const SETTINGS_ERROR_CATEGORY: &str = "settings";

/// A record owning settings
pub trait Configurable: Send {
    /// Owner reference used for the record's stored settings
    fn owner(&self) -> OwnerRef;

    /// The record's setting manager
    fn settings(&mut self) -> &mut SettingManager;

    /// Surface a failure through the record's own error reporting
    fn report_error(&mut self, category: &str, message: String);
}
