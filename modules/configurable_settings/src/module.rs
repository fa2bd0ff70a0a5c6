//! Module wiring: configuration, registered schemas and the setting store

use crate::config::Config;
use crate::contract::{OwnerRef, SchemaError, SettingsError};
use crate::domain::{Schema, SchemaRegistry, SettingManager, SettingStore};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{InMemorySettingStore, SeaOrmSettingStore};
use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Configurable settings module
pub struct ConfigurableSettingsModule {
    config: Config,
    registry: SchemaRegistry,
    store: Arc<dyn SettingStore>,
}

impl ConfigurableSettingsModule {
    pub fn new(config: Config, registry: SchemaRegistry, store: Arc<dyn SettingStore>) -> Self {
        Self {
            config,
            registry,
            store,
        }
    }

    /// Run migrations, load the configured schema documents and build the
    /// database-backed store
    pub async fn init(config: Config, db: Arc<DatabaseConnection>) -> Result<Self> {
        Migrator::up(db.as_ref(), None)
            .await
            .context("Failed to run configurable settings migrations")?;

        let registry = SchemaRegistry::from_config(&config)?;
        let store = Arc::new(SeaOrmSettingStore::new(db));

        tracing::info!(
            owner_kinds = ?registry.owner_kinds(),
            "Configurable settings initialized"
        );
        Ok(Self::new(config, registry, store))
    }

    /// Same as `init`, keeping rows in memory
    pub fn in_memory(config: Config) -> Result<Self> {
        let registry = SchemaRegistry::from_config(&config)?;
        Ok(Self::new(
            config,
            registry,
            Arc::new(InMemorySettingStore::new()),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> Arc<dyn SettingStore> {
        self.store.clone()
    }

    /// Register a schema declared in code
    pub fn register(&mut self, schema: Schema) -> Result<Arc<Schema>, SchemaError> {
        self.registry.register(schema)
    }

    /// Manager for one owner's settings
    pub fn manager(&self, owner: OwnerRef) -> Result<SettingManager, SettingsError> {
        self.registry.manager(owner, self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Entry, SettingValue};
    use uuid::Uuid;

    fn shop_schema() -> Schema {
        Schema::configure("shop", |s| {
            s.option("limit", |o| {
                o.format("integer")?.default(10)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_module() {
        let mut module = ConfigurableSettingsModule::in_memory(Config::default()).unwrap();
        assert!(module.registry().owner_kinds().is_empty());
        assert_eq!(module.config().max_value_length, Config::default().max_value_length);

        module.register(shop_schema()).unwrap();
        let owner = OwnerRef::new("shop", Uuid::new_v4());

        let mut manager = module.manager(owner.clone()).unwrap();
        let limit = manager.get("limit").await.unwrap().unwrap();
        assert_eq!(limit.value().unwrap(), Some(&SettingValue::Integer(10)));
        limit.update([Entry::value(25)]).await.unwrap();

        let rows = module.store().find_by_owner_and_key(&owner, "limit").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "25");

        let mut fresh = module.manager(owner).unwrap();
        let limit = fresh.get("limit").await.unwrap().unwrap();
        assert_eq!(limit.value().unwrap(), Some(&SettingValue::Integer(25)));

        let err = module
            .manager(OwnerRef::new("product", Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnknownOwnerKind {
                owner_kind: "product".to_string()
            }
        );
    }
}
