//! Domain layer - schemas, proxies and the per-owner manager

pub mod assign;
pub mod coercion;
pub mod document;
pub mod manager;
pub mod proxy;
pub mod registry;
pub mod repository;
pub mod schema;
pub mod validation;

pub use document::SchemaDocument;
pub use manager::SettingManager;
pub use proxy::{ProxyState, SettingProxy};
pub use registry::SchemaRegistry;
pub use repository::SettingStore;
pub use schema::{Format, OptionBuilder, OptionDef, Schema, SchemaBuilder};
pub use validation::Limits;
