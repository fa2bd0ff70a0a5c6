//! SeaORM repository implementations

use crate::contract::{NewSetting, OwnerRef, SettingId, StoredSetting};
use crate::domain::repository::SettingStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use super::{ensure_present, entity, mapper};

pub struct SeaOrmSettingStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSettingStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingStore for SeaOrmSettingStore {
    async fn find_by_owner_and_key(&self, owner: &OwnerRef, key: &str) -> Result<Vec<StoredSetting>> {
        let results = entity::Entity::find()
            .filter(entity::Column::OwnerKind.eq(owner.kind.as_str()))
            .filter(entity::Column::OwnerId.eq(owner.id))
            .filter(entity::Column::Key.eq(key))
            .order_by_asc(entity::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn create(&self, owner: &OwnerRef, setting: NewSetting) -> Result<StoredSetting> {
        ensure_present(&setting)?;

        let key = setting.key.clone();
        let model = mapper::new_active_model(owner, setting)
            .insert(&*self.db)
            .await
            .with_context(|| format!("Failed to insert `{}` for {}", key, owner))?;

        Ok(model.into())
    }

    async fn delete_by_ids(&self, ids: &[SettingId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let ids = ids
            .iter()
            .map(|id| i32::try_from(*id).context("Setting id out of range"))
            .collect::<Result<Vec<_>>>()?;

        entity::Entity::delete_many()
            .filter(entity::Column::Id.is_in(ids))
            .exec(&*self.db)
            .await?;

        Ok(())
    }

    async fn reload(&self, _owner: &OwnerRef) -> Result<()> {
        // Every read goes to the database
        Ok(())
    }
}
