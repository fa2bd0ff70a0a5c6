//! Storage layer - database entities and setting stores

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod repositories;

pub use memory::InMemorySettingStore;
pub use repositories::SeaOrmSettingStore;

use crate::contract::NewSetting;

/// Presence rules every stored row follows: a key and a non-blank value
pub(crate) fn ensure_present(setting: &NewSetting) -> anyhow::Result<()> {
    if setting.key.trim().is_empty() {
        anyhow::bail!("Setting key can't be blank");
    }
    if setting.value.trim().is_empty() {
        anyhow::bail!("Value for `{}` can't be blank", setting.key);
    }
    Ok(())
}
