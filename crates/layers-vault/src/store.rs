//! Key store contract
//!
//! Named seeds in insertion order. The core only ever reads from a store;
//! every mutation goes through this trait.

use layers_core::KeyRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("Key name is required")]
    EmptyName,
    #[error("Key seed is required")]
    EmptySeed,
    #[error("Key already exists: {0}")]
    AlreadyExists(String),
    #[error("Key does not exist: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub trait KeyStore {
    /// Key names in insertion order.
    fn list(&self) -> Result<Vec<String>, KeyStoreError>;

    fn get(&self, name: &str) -> Result<Option<KeyRecord>, KeyStoreError>;

    /// Create a key with a freshly generated seed.
    fn create(&self, name: &str) -> Result<KeyRecord, KeyStoreError>;

    /// Store a key whose seed came from elsewhere (an invitation, a rename).
    fn create_imported(&self, name: &str, seed: &str) -> Result<KeyRecord, KeyStoreError>;

    fn remove(&self, name: &str) -> Result<(), KeyStoreError>;

    /// Every record in list order.
    fn records(&self) -> Result<Vec<KeyRecord>, KeyStoreError> {
        let mut records = Vec::new();
        for name in self.list()? {
            if let Some(record) = self.get(&name)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
