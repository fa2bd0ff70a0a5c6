//! Per-key runtime handle over one owner's setting
//!
//! A proxy holds the pending view of one option for one owner. The pending
//! view starts as what the store holds (or the option's default), changes on
//! `replace`/`set_value`, and becomes the stored baseline again once `save`
//! succeeds. Writes replace every row of the key: old rows are deleted first,
//! then one row per entry is inserted. Readers running in between can see no
//! rows at all for the key.

use super::coercion::coerce;
use super::repository::SettingStore;
use super::schema::OptionDef;
use super::validation::{self, Limits};
use crate::contract::{
    Entry, NewSetting, OwnerRef, Replacement, SettingValue, SettingView, SettingsError,
    StoredSetting,
};
use std::fmt;
use std::sync::Arc;

/// Whether the pending view still matches the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    Loaded,
    Modified,
}

pub struct SettingProxy {
    option: Arc<OptionDef>,
    owner: OwnerRef,
    store: Arc<dyn SettingStore>,
    limits: Limits,
    pending: SettingView,
    state: ProxyState,
    last_errors: Vec<String>,
}

impl fmt::Debug for SettingProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingProxy")
            .field("key", &self.option.key())
            .field("owner", &self.owner)
            .field("pending", &self.pending)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SettingProxy {
    /// Load the stored rows for the option and build the pending view
    pub async fn load(
        option: Arc<OptionDef>,
        owner: OwnerRef,
        store: Arc<dyn SettingStore>,
        limits: Limits,
    ) -> Result<Self, SettingsError> {
        let pending = read(&option, &owner, store.as_ref()).await?;

        Ok(Self {
            option,
            owner,
            store,
            limits,
            pending,
            state: ProxyState::Loaded,
            last_errors: Vec::new(),
        })
    }

    pub fn key(&self) -> &str {
        self.option.key()
    }

    pub fn option(&self) -> &OptionDef {
        &self.option
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn state(&self) -> ProxyState {
        self.state
    }

    pub fn is_multiple(&self) -> bool {
        self.option.allow_multiple()
    }

    pub fn view(&self) -> &SettingView {
        &self.pending
    }

    /// Messages from the last lenient update or validation
    pub fn last_errors(&self) -> &[String] {
        &self.last_errors
    }

    /// Pending entry of a single-value option
    pub fn single(&self) -> Result<&Entry, SettingsError> {
        match &self.pending {
            SettingView::Single(entry) => Ok(entry),
            SettingView::Multiple(_) => Err(self.shape_error(
                "Options allowing multiple values are read with `entries`, not `single`.",
            )),
        }
    }

    pub fn value(&self) -> Result<Option<&SettingValue>, SettingsError> {
        Ok(self.single()?.value.as_ref())
    }

    pub fn modifier(&self) -> Result<Option<&str>, SettingsError> {
        Ok(self.single()?.modifier.as_deref())
    }

    /// Pending entries of a multiple-value option
    pub fn entries(&self) -> Result<&[Entry], SettingsError> {
        match &self.pending {
            SettingView::Multiple(entries) => Ok(entries),
            SettingView::Single(_) => Err(self.shape_error(
                "Single-value options are read with `single`, not `entries`.",
            )),
        }
    }

    /// Replace the pending view without persisting anything
    pub fn replace(&mut self, replacement: impl Into<Replacement>) -> Result<(), SettingsError> {
        self.pending = self.shaped(replacement.into())?;
        self.state = ProxyState::Modified;
        Ok(())
    }

    /// Change only the pending value of a single-value option
    pub fn set_value(&mut self, value: Option<SettingValue>) -> Result<(), SettingsError> {
        match &mut self.pending {
            SettingView::Single(entry) => entry.value = value,
            SettingView::Multiple(_) => {
                return Err(self.shape_error("A list of modifier/value pairs expected."));
            }
        }
        self.state = ProxyState::Modified;
        Ok(())
    }

    /// Change only the pending modifier of a single-value option
    pub fn set_modifier(&mut self, modifier: Option<String>) -> Result<(), SettingsError> {
        match &mut self.pending {
            SettingView::Single(entry) => entry.modifier = modifier,
            SettingView::Multiple(_) => {
                return Err(self.shape_error("A list of modifier/value pairs expected."));
            }
        }
        self.state = ProxyState::Modified;
        Ok(())
    }

    /// Every rule broken by the pending entries
    pub fn validation_errors(&self) -> Vec<String> {
        self.pending_entries()
            .iter()
            .flat_map(|entry| validation::entry_errors(&self.option, entry, &self.limits))
            .collect()
    }

    /// Validate the pending entries, remembering the messages
    pub fn validate(&mut self) -> Result<(), SettingsError> {
        let result = validation::validate_entries(&self.option, self.pending_entries(), &self.limits);
        self.last_errors = match &result {
            Err(SettingsError::Validation { errors, .. }) => errors.clone(),
            _ => Vec::new(),
        };
        result
    }

    /// Persist the pending entries, replacing every stored row for the key.
    ///
    /// Nothing is written unless all pending entries pass validation. When an
    /// insert fails, the rows inserted so far are removed and the original rows
    /// are recreated.
    pub async fn save(&mut self) -> Result<(), SettingsError> {
        self.validate()?;

        let key = self.key().to_string();
        let rows: Vec<NewSetting> = self
            .pending_entries()
            .iter()
            .filter_map(|entry| {
                entry.value.as_ref().map(|value| NewSetting {
                    key: key.clone(),
                    modifier: entry.modifier.clone(),
                    value: value.to_storage(),
                })
            })
            .collect();

        let originals = self
            .store
            .find_by_owner_and_key(&self.owner, &key)
            .await
            .map_err(|e| persistence(&key, e))?;

        let original_ids: Vec<_> = originals.iter().map(|row| row.id).collect();
        if !original_ids.is_empty() {
            self.store
                .delete_by_ids(&original_ids)
                .await
                .map_err(|e| persistence(&key, e))?;
        }

        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            match self.store.create(&self.owner, row).await {
                Ok(stored) => created.push(stored),
                Err(err) => {
                    tracing::warn!(
                        owner = %self.owner,
                        key = %key,
                        "Failed to insert setting row, restoring previous rows: {:#}",
                        err
                    );
                    self.restore(&created, &originals).await;
                    return Err(persistence(&key, err));
                }
            }
        }

        self.pending = view_from_rows(&self.option, &created);
        self.state = ProxyState::Loaded;
        tracing::info!(
            owner = %self.owner,
            key = %key,
            rows = created.len(),
            "Setting saved"
        );
        Ok(())
    }

    /// Replace, validate and persist in one step.
    ///
    /// Several pairs are only accepted by options allowing multiple values.
    /// On failure the pending view is left as it was before the call.
    pub async fn update<I>(&mut self, pairs: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut pairs: Vec<Entry> = pairs.into_iter().collect();
        let replacement = match pairs.len() {
            0 => Replacement::Clear,
            1 if !self.is_multiple() => Replacement::One(pairs.remove(0)),
            _ => Replacement::Many(pairs),
        };

        let previous = (self.pending.clone(), self.state);
        self.replace(replacement)?;

        if let Err(err) = self.save().await {
            (self.pending, self.state) = previous;
            return Err(err);
        }

        Ok(())
    }

    /// Lenient `update`: rule and persistence failures become `Ok(false)` and
    /// their messages are kept in `last_errors`.
    pub async fn try_update<I>(&mut self, pairs: I) -> Result<bool, SettingsError>
    where
        I: IntoIterator<Item = Entry>,
    {
        match self.update(pairs).await {
            Ok(()) => {
                self.last_errors.clear();
                Ok(true)
            }
            Err(SettingsError::Validation { errors, .. }) => {
                self.last_errors = errors;
                Ok(false)
            }
            Err(SettingsError::Persistence { reason, .. }) => {
                self.last_errors = vec![reason];
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Drop the pending view and read the store again
    pub async fn reload(&mut self) -> Result<(), SettingsError> {
        self.pending = read(&self.option, &self.owner, self.store.as_ref()).await?;
        self.state = ProxyState::Loaded;
        self.last_errors.clear();
        Ok(())
    }

    fn pending_entries(&self) -> &[Entry] {
        match &self.pending {
            SettingView::Single(entry) => std::slice::from_ref(entry),
            SettingView::Multiple(entries) => entries,
        }
    }

    fn shaped(&self, replacement: Replacement) -> Result<SettingView, SettingsError> {
        if self.is_multiple() {
            let entries = match replacement {
                Replacement::Clear => Vec::new(),
                Replacement::One(entry) => vec![entry],
                Replacement::Many(entries) => entries,
            };
            return Ok(SettingView::Multiple(
                entries.into_iter().filter(|e| !e.is_blank()).collect(),
            ));
        }

        match replacement {
            Replacement::Clear => Ok(SettingView::Single(default_entry(&self.option))),
            Replacement::One(entry) => Ok(SettingView::Single(entry)),
            Replacement::Many(_) => {
                Err(self.shape_error("A single modifier/value pair expected."))
            }
        }
    }

    async fn restore(&self, created: &[StoredSetting], originals: &[StoredSetting]) {
        let created_ids: Vec<_> = created.iter().map(|row| row.id).collect();
        if !created_ids.is_empty() {
            if let Err(err) = self.store.delete_by_ids(&created_ids).await {
                tracing::error!(
                    owner = %self.owner,
                    key = %self.key(),
                    "Failed to remove partially inserted rows: {:#}",
                    err
                );
            }
        }

        for original in originals {
            let row = NewSetting {
                key: original.key.clone(),
                modifier: original.modifier.clone(),
                value: original.value.clone(),
            };
            if let Err(err) = self.store.create(&self.owner, row).await {
                tracing::error!(
                    owner = %self.owner,
                    key = %self.key(),
                    "Failed to restore setting row {}: {:#}",
                    original.id,
                    err
                );
            }
        }
    }

    fn shape_error(&self, details: &str) -> SettingsError {
        SettingsError::ArgumentShape {
            key: self.key().to_string(),
            details: details.to_string(),
        }
    }
}

fn default_entry(option: &OptionDef) -> Entry {
    Entry {
        modifier: None,
        value: option.default_value().cloned(),
    }
}

fn persistence(key: &str, err: anyhow::Error) -> SettingsError {
    SettingsError::Persistence {
        key: key.to_string(),
        reason: format!("{:#}", err),
    }
}

async fn read(
    option: &OptionDef,
    owner: &OwnerRef,
    store: &dyn SettingStore,
) -> Result<SettingView, SettingsError> {
    let rows = store
        .find_by_owner_and_key(owner, option.key())
        .await
        .map_err(SettingsError::storage)?;

    tracing::debug!(owner = %owner, key = %option.key(), rows = rows.len(), "Setting loaded");

    if !option.allow_multiple() && rows.len() > 1 {
        tracing::warn!(
            owner = %owner,
            key = %option.key(),
            rows = rows.len(),
            "Single-value setting has several stored rows, using the first"
        );
    }

    Ok(view_from_rows(option, &rows))
}

/// Pending view as the store holds it, values coerced under the option's format
fn view_from_rows(option: &OptionDef, rows: &[StoredSetting]) -> SettingView {
    let format = option.allowed_format();
    let entry_for = |row: &StoredSetting| Entry {
        modifier: row.modifier.clone(),
        value: Some(coerce(&row.value, format)),
    };

    if option.allow_multiple() {
        return SettingView::Multiple(rows.iter().map(entry_for).collect());
    }

    SettingView::Single(rows.first().map_or_else(|| default_entry(option), entry_for))
}
