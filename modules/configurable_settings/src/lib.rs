//! Configurable Settings Module
//!
//! Typed, validated configuration attached to owner records. Each owner kind
//! declares a schema of options (default, format, allowed values, allowed
//! modifiers, multiplicity); values are stored as text rows keyed by owner
//! and option key, and read back through per-key proxies with their
//! in-memory types restored.

// Public exports
pub mod contract;
pub use contract::{
    Configurable, Entry, OwnerRef, Replacement, SchemaError, SettingValue, SettingView,
    SettingsError,
};

pub mod config;
pub use config::Config;

pub mod domain;
pub use domain::{Schema, SchemaRegistry, SettingManager, SettingProxy};

pub mod host;

pub mod module;
pub use module::ConfigurableSettingsModule;

pub mod infra;
