//! Schemas registered per owner kind

use super::document::SchemaDocument;
use super::manager::SettingManager;
use super::repository::SettingStore;
use super::schema::{Schema, SchemaBuilder};
use super::validation::Limits;
use crate::config::Config;
use crate::contract::{OwnerRef, SchemaError, SettingsError};
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    limits: Limits,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Build a registry from the schema documents listed in the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut registry = Self::new().with_limits(config.limits());

        for path in &config.schema_files {
            let document = read_document(path)?;
            let schema = registry
                .load_document(document)
                .with_context(|| format!("Invalid schema document {}", path.display()))?;
            tracing::info!(
                owner_kind = %schema.owner_kind(),
                options = schema.len(),
                path = %path.display(),
                "Schema registered"
            );
        }

        Ok(registry)
    }

    pub fn register(&mut self, schema: Schema) -> Result<Arc<Schema>, SchemaError> {
        if self.schemas.contains_key(schema.owner_kind()) {
            return Err(SchemaError::DuplicateSchema {
                owner_kind: schema.owner_kind().to_string(),
            });
        }

        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.owner_kind().to_string(), schema.clone());
        Ok(schema)
    }

    /// Declare and register a schema in one step
    pub fn configure<F>(
        &mut self,
        owner_kind: impl Into<String>,
        declare: F,
    ) -> Result<Arc<Schema>, SchemaError>
    where
        F: FnOnce(&mut SchemaBuilder) -> Result<(), SchemaError>,
    {
        self.register(Schema::configure(owner_kind, declare)?)
    }

    pub fn load_document(&mut self, document: SchemaDocument) -> Result<Arc<Schema>, SchemaError> {
        self.register(document.into_schema()?)
    }

    pub fn schema(&self, owner_kind: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(owner_kind)
    }

    /// Registered owner kinds, sorted
    pub fn owner_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Manager for one owner, backed by `store`
    pub fn manager(
        &self,
        owner: OwnerRef,
        store: Arc<dyn SettingStore>,
    ) -> Result<SettingManager, SettingsError> {
        let schema = self
            .schemas
            .get(&owner.kind)
            .cloned()
            .ok_or_else(|| SettingsError::UnknownOwnerKind {
                owner_kind: owner.kind.clone(),
            })?;

        Ok(SettingManager::new(schema, owner, store)?.with_limits(self.limits))
    }
}

fn read_document(path: &Path) -> anyhow::Result<SchemaDocument> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema document {}", path.display()))?;

    let document = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => SchemaDocument::from_json(&source),
        _ => SchemaDocument::from_yaml(&source),
    };

    document.with_context(|| format!("Failed to parse schema document {}", path.display()))
}
