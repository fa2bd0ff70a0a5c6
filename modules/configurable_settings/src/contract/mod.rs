//! Contract layer - public types shared with host records and storage adapters
//!
//! Models are transport-agnostic; no serde derives here.

pub mod client;
pub mod error;
pub mod model;

pub use client::{Configurable, SETTINGS_ERROR_CATEGORY};
pub use error::{SchemaError, SettingsError};
pub use model::{
    Entry, NewSetting, OwnerRef, Replacement, SettingId, SettingValue, SettingView, StoredSetting,
};
