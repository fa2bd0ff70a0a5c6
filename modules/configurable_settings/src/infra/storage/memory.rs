//! In-memory setting store
//!
//! Rows live in a `parking_lot::RwLock` and get increasing ids, so reads
//! return them in insertion order like the SQL store does.

use crate::contract::{NewSetting, OwnerRef, SettingId, StoredSetting};
use crate::domain::repository::SettingStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::ensure_present;

#[derive(Debug, Default)]
pub struct InMemorySettingStore {
    inner: RwLock<Rows>,
}

#[derive(Debug, Default)]
struct Rows {
    next_id: SettingId,
    rows: BTreeMap<SettingId, StoredSetting>,
}

impl InMemorySettingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across every owner
    pub fn count(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// Stored rows of one owner's key, oldest first
    pub fn rows(&self, owner: &OwnerRef, key: &str) -> Vec<StoredSetting> {
        self.inner
            .read()
            .rows
            .values()
            .filter(|row| &row.owner == owner && row.key == key)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SettingStore for InMemorySettingStore {
    async fn find_by_owner_and_key(&self, owner: &OwnerRef, key: &str) -> Result<Vec<StoredSetting>> {
        Ok(self.rows(owner, key))
    }

    async fn create(&self, owner: &OwnerRef, setting: NewSetting) -> Result<StoredSetting> {
        ensure_present(&setting)?;

        let mut inner = self.inner.write();
        inner.next_id += 1;

        let now = Utc::now();
        let row = StoredSetting {
            id: inner.next_id,
            owner: owner.clone(),
            key: setting.key,
            modifier: setting.modifier,
            value: setting.value,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn delete_by_ids(&self, ids: &[SettingId]) -> Result<()> {
        let mut inner = self.inner.write();
        for id in ids {
            inner.rows.remove(id);
        }
        Ok(())
    }

    async fn reload(&self, _owner: &OwnerRef) -> Result<()> {
        Ok(())
    }
}
