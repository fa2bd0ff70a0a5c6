//! Common test utilities: the category schema, owners and a failing store
#![allow(dead_code)]

use async_trait::async_trait;
use configurable_settings::contract::{NewSetting, OwnerRef, SettingId, StoredSetting};
use configurable_settings::domain::{Schema, SchemaRegistry, SettingManager, SettingStore};
use configurable_settings::infra::storage::InMemorySettingStore;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

pub const CATEGORY: &str = "category";

/// Category schema used across the integration tests
pub fn category_schema() -> Schema {
    Schema::configure(CATEGORY, |s| {
        s.option("sort", |o| {
            o.default("alphabetical")?.restrict(["alphabetical", "manual"])?;
            Ok(())
        })?;
        s.option("price_filter", |o| {
            o.format("float")?
                .modifiers(["eq", "lt", "gt", "lte", "gte"])?
                .multiple(true)?;
            Ok(())
        })?;
        s.option("limit", |o| {
            o.format("integer")?;
            Ok(())
        })?;
        s.option("deleted", |o| {
            o.format("boolean")?.default(false)?;
            Ok(())
        })?;
        s.option("contact", |o| {
            o.format("email")?;
            Ok(())
        })?;
        s.option("homepage", |o| {
            o.format("url")?;
            Ok(())
        })?;
        s.option("code", |o| {
            o.pattern("^[A-Z]{3}$")?;
            Ok(())
        })?;
        s.option("title", |o| {
            o.format("string")?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap()
}

pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(category_schema()).unwrap();
    registry
}

pub fn category_owner() -> OwnerRef {
    OwnerRef::new(CATEGORY, Uuid::new_v4())
}

/// Manager for a fresh category over `store`
pub fn category_manager(store: Arc<dyn SettingStore>) -> (OwnerRef, SettingManager) {
    let owner = category_owner();
    let manager = registry().manager(owner.clone(), store).unwrap();
    (owner, manager)
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// Store that refuses to insert one particular value, like a constraint violation
pub struct FailingStore {
    inner: InMemorySettingStore,
    rejected: RwLock<Option<String>>,
    create_calls: RwLock<usize>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySettingStore::new(),
            rejected: RwLock::new(None),
            create_calls: RwLock::new(0),
        }
    }

    /// Fail every insert whose stored text is `value`
    pub fn reject(&self, value: &str) {
        *self.rejected.write() = Some(value.to_string());
    }

    pub fn create_calls(&self) -> usize {
        *self.create_calls.read()
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    pub fn rows(&self, owner: &OwnerRef, key: &str) -> Vec<StoredSetting> {
        self.inner.rows(owner, key)
    }
}

#[async_trait]
impl SettingStore for FailingStore {
    async fn find_by_owner_and_key(
        &self,
        owner: &OwnerRef,
        key: &str,
    ) -> anyhow::Result<Vec<StoredSetting>> {
        self.inner.find_by_owner_and_key(owner, key).await
    }

    async fn create(&self, owner: &OwnerRef, setting: NewSetting) -> anyhow::Result<StoredSetting> {
        *self.create_calls.write() += 1;
        if self.rejected.read().as_deref() == Some(setting.value.as_str()) {
            anyhow::bail!("constraint violation on `{}`", setting.value);
        }
        self.inner.create(owner, setting).await
    }

    async fn delete_by_ids(&self, ids: &[SettingId]) -> anyhow::Result<()> {
        self.inner.delete_by_ids(ids).await
    }

    async fn reload(&self, owner: &OwnerRef) -> anyhow::Result<()> {
        self.inner.reload(owner).await
    }
}
