//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// One stored modifier/value row of an owner's setting
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "configurable_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Registered owner kind (e.g., "category")
    pub owner_kind: String,

    pub owner_id: Uuid,

    /// Option key declared in the owner kind's schema
    pub key: String,

    pub modifier: Option<String>,

    /// Storage text of the value, whatever the option's format
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
