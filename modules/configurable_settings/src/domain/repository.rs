//! Store trait for setting rows
//!
//! This trait is the only way the domain reaches persisted settings.
//! Implementations are in infra/storage.

use crate::contract::{NewSetting, OwnerRef, SettingId, StoredSetting};
use anyhow::Result;
use async_trait::async_trait;

/// Key/value row store for settings
#[async_trait]
pub trait SettingStore: Send + Sync {
    /// Rows for one owner and key, in storage order (oldest first)
    async fn find_by_owner_and_key(&self, owner: &OwnerRef, key: &str)
        -> Result<Vec<StoredSetting>>;

    /// Create one row; fails with the reason (e.g. a constraint violation)
    async fn create(&self, owner: &OwnerRef, setting: NewSetting) -> Result<StoredSetting>;

    /// Delete rows by id
    async fn delete_by_ids(&self, ids: &[SettingId]) -> Result<()>;

    /// Invalidate anything cached for the owner
    async fn reload(&self, owner: &OwnerRef) -> Result<()>;
}
