//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{NewSetting, OwnerRef, SettingId, StoredSetting};
use chrono::Utc;

impl From<entity::Model> for StoredSetting {
    fn from(entity: entity::Model) -> Self {
        Self {
            id: SettingId::from(entity.id),
            owner: OwnerRef::new(entity.owner_kind, entity.owner_id),
            key: entity.key,
            modifier: entity.modifier,
            value: entity.value,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Active model for a row to be inserted; the id is assigned by the database
pub fn new_active_model(owner: &OwnerRef, setting: NewSetting) -> entity::ActiveModel {
    use sea_orm::ActiveValue::*;

    let now = Utc::now();
    entity::ActiveModel {
        id: NotSet,
        owner_kind: Set(owner.kind.clone()),
        owner_id: Set(owner.id),
        key: Set(setting.key),
        modifier: Set(setting.modifier),
        value: Set(setting.value),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
