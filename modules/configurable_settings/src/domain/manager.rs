//! Per-owner registry of setting proxies
//!
//! The manager creates a proxy the first time a key is read and keeps it
//! until `reload`. Batch operations only touch proxies whose pending view was
//! changed. `save_all` is best-effort: each key is validated and saved on its
//! own, and keys saved before a later failure stay saved.

use super::assign;
use super::proxy::{ProxyState, SettingProxy};
use super::repository::SettingStore;
use super::schema::Schema;
use super::validation::Limits;
use crate::contract::{OwnerRef, Replacement, SettingView, SettingsError};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct SettingManager {
    schema: Arc<Schema>,
    owner: OwnerRef,
    store: Arc<dyn SettingStore>,
    limits: Limits,
    proxies: BTreeMap<String, SettingProxy>,
    errors: Vec<String>,
}

impl std::fmt::Debug for SettingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingManager")
            .field("owner", &self.owner)
            .field("proxies", &self.proxies)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl SettingManager {
    /// Create a manager for one owner. The owner kind must match the schema's.
    pub fn new(
        schema: Arc<Schema>,
        owner: OwnerRef,
        store: Arc<dyn SettingStore>,
    ) -> Result<Self, SettingsError> {
        if schema.owner_kind() != owner.kind {
            return Err(SettingsError::UnknownOwnerKind {
                owner_kind: owner.kind,
            });
        }

        Ok(Self {
            schema,
            owner,
            store,
            limits: Limits::default(),
            proxies: BTreeMap::new(),
            errors: Vec::new(),
        })
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// Messages collected by the last `validate_all`/`save_all`
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Keys whose pending view differs from the store
    pub fn modified_keys(&self) -> Vec<&str> {
        self.proxies
            .iter()
            .filter(|(_, proxy)| proxy.state() == ProxyState::Modified)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Proxy for `key`, loading it on first access. `Ok(None)` when the key
    /// isn't declared in the schema.
    pub async fn get(&mut self, key: &str) -> Result<Option<&mut SettingProxy>, SettingsError> {
        let Some(option) = self.schema.option(key).cloned() else {
            return Ok(None);
        };

        if !self.proxies.contains_key(key) {
            let proxy = SettingProxy::load(
                option,
                self.owner.clone(),
                self.store.clone(),
                self.limits,
            )
            .await?;
            self.proxies.insert(key.to_string(), proxy);
        }

        Ok(self.proxies.get_mut(key))
    }

    /// Pending view of `key`, or `None` for an undeclared key
    pub async fn read(&mut self, key: &str) -> Result<Option<SettingView>, SettingsError> {
        Ok(self.get(key).await?.map(|proxy| proxy.view().clone()))
    }

    /// Replace the pending view of `key`. Returns `false` for an undeclared key.
    pub async fn set(
        &mut self,
        key: &str,
        replacement: impl Into<Replacement>,
    ) -> Result<bool, SettingsError> {
        match self.get(key).await? {
            Some(proxy) => {
                proxy.replace(replacement)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace several keys; undeclared keys are skipped and returned
    pub async fn write_all<I, K>(&mut self, values: I) -> Result<Vec<String>, SettingsError>
    where
        I: IntoIterator<Item = (K, Replacement)>,
        K: AsRef<str>,
    {
        let mut ignored = Vec::new();

        for (key, replacement) in values {
            let key = key.as_ref();
            if !self.set(key, replacement).await? {
                tracing::warn!(owner = %self.owner, key = %key, "Ignoring undeclared setting");
                ignored.push(key.to_string());
            }
        }

        Ok(ignored)
    }

    /// `write_all` from a JSON object
    pub async fn assign_json(
        &mut self,
        values: &serde_json::Value,
    ) -> Result<Vec<String>, SettingsError> {
        let replacements = assign::replacements_from_json(values)?;
        self.write_all(replacements).await
    }

    /// Validate every modified proxy, collecting all messages.
    /// Returns `true` when nothing failed.
    pub fn validate_all(&mut self) -> bool {
        self.errors.clear();

        for proxy in self.proxies.values_mut() {
            if proxy.state() != ProxyState::Modified {
                continue;
            }
            if let Err(SettingsError::Validation { errors, .. }) = proxy.validate() {
                self.errors.extend(errors);
            }
        }

        self.errors.is_empty()
    }

    /// Save every modified proxy. Every save is attempted; the result is
    /// `true` only when none failed. Earlier saves aren't rolled back.
    pub async fn save_all(&mut self) -> bool {
        self.errors.clear();
        let mut failed = Vec::new();

        for (key, proxy) in self.proxies.iter_mut() {
            if proxy.state() != ProxyState::Modified {
                continue;
            }

            match proxy.save().await {
                Ok(()) => {}
                Err(SettingsError::Validation { errors, .. }) => {
                    self.errors.extend(errors);
                    failed.push(key.clone());
                }
                Err(err) => {
                    self.errors.push(err.to_string());
                    failed.push(key.clone());
                }
            }
        }

        if !failed.is_empty() {
            tracing::warn!(
                owner = %self.owner,
                failed = ?failed,
                "Some settings could not be saved"
            );
        }

        failed.is_empty()
    }

    /// `write_all`, then `validate_all`, then `save_all` when validation passed
    pub async fn update_all<I, K>(&mut self, values: I) -> Result<bool, SettingsError>
    where
        I: IntoIterator<Item = (K, Replacement)>,
        K: AsRef<str>,
    {
        self.write_all(values).await?;

        if !self.validate_all() {
            return Ok(false);
        }

        Ok(self.save_all().await)
    }

    /// Discard every proxy; the next access reads the store again
    pub async fn reload(&mut self) -> Result<(), SettingsError> {
        self.store
            .reload(&self.owner)
            .await
            .map_err(SettingsError::storage)?;
        self.proxies.clear();
        self.errors.clear();
        Ok(())
    }

    /// Pending view of every declared key
    pub async fn snapshot(&mut self) -> Result<BTreeMap<String, SettingView>, SettingsError> {
        let keys: Vec<String> = self.schema.keys().into_iter().map(str::to_string).collect();
        let mut snapshot = BTreeMap::new();

        for key in keys {
            if let Some(view) = self.read(&key).await? {
                snapshot.insert(key, view);
            }
        }

        Ok(snapshot)
    }
}
