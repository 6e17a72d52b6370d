//! Vault workflow
//!
//! Everything a user does with their keys: generate, import, rename,
//! remove, pick the active one, and process a message with it. Processing
//! hands the store's keys to the resolver and follows its verdict.

use anyhow::Context;
use layers_core::{resolve, EncodeError, KeyRecord, Resolution};
use thiserror::Error;

use crate::config::VaultConfig;
use crate::db::SqliteKeyStore;
use crate::store::{KeyStore, KeyStoreError};

/// Settings key holding the selected key name
const LAST_USED_KEY: &str = "last_used_key";

/// Settings key holding the shared-message counter
const SHARE_COUNT: &str = "share_count";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error(transparent)]
    Store(#[from] KeyStoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("Message is empty")]
    EmptyInput,
    #[error("Select a key first")]
    NoActiveKey,
    #[error("New name is the same as the current name")]
    NameUnchanged,
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        VaultError::Store(KeyStoreError::Database(err))
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

pub struct Vault {
    store: SqliteKeyStore,
}

impl Vault {
    /// Open the vault described by `config`, creating its data directory.
    ///
    /// `config` is used as given. Load it with [`VaultConfig::load`] to pick
    /// up environment overrides.
    pub fn open(config: &VaultConfig) -> anyhow::Result<Self> {
        config.validate().context("Configuration validation failed")?;

        std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
            format!(
                "Failed to create data dir: {}",
                config.storage.data_dir.display()
            )
        })?;

        let db_path = config.db_path();
        let store = SqliteKeyStore::open(&db_path)
            .with_context(|| format!("Failed to open key store at {}", db_path.display()))?
            .with_seed_length(config.keys.seed_length);

        log::info!("Vault opened: {}", db_path.display());
        Ok(Self::new(store))
    }

    pub fn new(store: SqliteKeyStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqliteKeyStore {
        &self.store
    }

    /// Key names in store order.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.list()?)
    }

    pub fn get(&self, name: &str) -> Result<Option<KeyRecord>> {
        Ok(self.store.get(name)?)
    }

    /// Create a key with a fresh random seed.
    pub fn generate(&self, name: &str) -> Result<KeyRecord> {
        Ok(self.store.create(name.trim())?)
    }

    /// Import a seed received from someone else and select it.
    ///
    /// A taken name gets a ` (1)`, ` (2)`, … suffix instead of failing.
    pub fn import(&self, name: &str, seed: &str) -> Result<KeyRecord> {
        let name = name.trim();
        let seed = seed.trim();
        if name.is_empty() {
            return Err(KeyStoreError::EmptyName.into());
        }

        let mut final_name = name.to_string();
        let mut counter = 1;
        while self.store.get(&final_name)?.is_some() {
            final_name = format!("{} ({})", name, counter);
            counter += 1;
        }

        let record = self.store.create_imported(&final_name, seed)?;
        self.select(&record.name)?;
        Ok(record)
    }

    /// Rename a key by re-creating it under the new name. The renamed key
    /// moves to the end of the list.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<KeyRecord> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(KeyStoreError::EmptyName.into());
        }
        if new_name == old_name {
            return Err(VaultError::NameUnchanged);
        }
        if self.store.get(new_name)?.is_some() {
            return Err(KeyStoreError::AlreadyExists(new_name.to_string()).into());
        }

        let old = self
            .store
            .get(old_name)?
            .ok_or_else(|| KeyStoreError::NotFound(old_name.to_string()))?;

        // Both names or neither: a failed step rolls the whole rename back
        let tx = self.store.transaction()?;
        let record = self.store.create_imported(new_name, &old.seed)?;
        self.store.remove(old_name)?;
        if self.selected()?.as_deref() == Some(old_name) {
            self.store.setting_set(LAST_USED_KEY, new_name)?;
        }
        tx.commit()?;

        log::info!("Renamed key '{}' to '{}'", old_name, new_name);
        Ok(record)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.store.remove(name)?;
        if self.selected()?.as_deref() == Some(name) {
            self.store.setting_delete(LAST_USED_KEY)?;
        }
        Ok(())
    }

    /// Make `name` the active key.
    pub fn select(&self, name: &str) -> Result<()> {
        if self.store.get(name)?.is_none() {
            return Err(KeyStoreError::NotFound(name.to_string()).into());
        }
        self.store.setting_set(LAST_USED_KEY, name)?;
        Ok(())
    }

    fn selected(&self) -> Result<Option<String>> {
        Ok(self.store.setting_get(LAST_USED_KEY)?)
    }

    /// The active key: the last one used if it still exists, otherwise the
    /// first key in the list. `None` only when the store is empty.
    pub fn active_key(&self) -> Result<Option<KeyRecord>> {
        let names = self.store.list()?;
        let Some(first) = names.first() else {
            return Ok(None);
        };

        let selected = self.selected()?;
        let active = match &selected {
            Some(name) if names.contains(name) => name.clone(),
            _ => first.clone(),
        };
        if selected.as_deref() != Some(active.as_str()) {
            self.store.setting_set(LAST_USED_KEY, &active)?;
        }

        Ok(self.store.get(&active)?)
    }

    /// Decrypt or encrypt `input` with the user's keys.
    ///
    /// When a key other than the active one opens the message, that key
    /// becomes active.
    pub fn process(&self, input: &str) -> Result<Resolution> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VaultError::EmptyInput);
        }

        let active = self.active_key()?.ok_or(VaultError::NoActiveKey)?;
        let candidates = self.store.records()?;

        let resolution = resolve(input, &active, &candidates)?;

        if let Some(matched) = resolution.matched_name() {
            if matched != active.name {
                self.store.setting_set(LAST_USED_KEY, matched)?;
                log::info!("Active key switched to '{}'", matched);
            }
        }

        Ok(resolution)
    }

    /// Count one shared message. Returns the new total.
    pub fn record_share(&self) -> Result<u64> {
        let count = self.share_count()? + 1;
        self.store.setting_set(SHARE_COUNT, &count.to_string())?;
        Ok(count)
    }

    pub fn share_count(&self) -> Result<u64> {
        let Some(raw) = self.store.setting_get(SHARE_COUNT)? else {
            return Ok(0);
        };
        Ok(raw.parse().unwrap_or_else(|_| {
            log::warn!("Share counter holds {:?}, starting over from 0", raw);
            0
        }))
    }

    /// Delete every key, the selection and the share counter.
    pub fn reset(&self) -> Result<()> {
        Ok(self.store.reset()?)
    }
}
