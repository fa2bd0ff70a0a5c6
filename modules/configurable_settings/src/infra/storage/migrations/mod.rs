//! Database migrations for configurable settings

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_configurable_settings::Migration)]
    }
}

mod m20250301_000001_create_configurable_settings {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ConfigurableSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ConfigurableSettings::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ConfigurableSettings::OwnerKind)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ConfigurableSettings::OwnerId).uuid().not_null())
                        .col(ColumnDef::new(ConfigurableSettings::Key).string().not_null())
                        .col(ColumnDef::new(ConfigurableSettings::Modifier).string())
                        .col(ColumnDef::new(ConfigurableSettings::Value).text().not_null())
                        .col(
                            ColumnDef::new(ConfigurableSettings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(ConfigurableSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_configurable_settings_owner_key")
                        .table(ConfigurableSettings::Table)
                        .col(ConfigurableSettings::OwnerKind)
                        .col(ConfigurableSettings::OwnerId)
                        .col(ConfigurableSettings::Key)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ConfigurableSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ConfigurableSettings {
        Table,
        Id,
        OwnerKind,
        OwnerId,
        Key,
        Modifier,
        Value,
        CreatedAt,
        UpdatedAt,
    }
}
