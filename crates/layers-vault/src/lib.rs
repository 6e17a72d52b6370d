//! Layers Vault
//!
//! Persistent key storage and the message workflow built on `layers-core`.
//!
//! Keys are kept in SQLite in the order they were added. [`Vault::process`]
//! takes whatever the user pasted, opens it with the first key that can, or
//! encrypts it under the active key.

pub mod config;
pub mod db;
pub mod store;
pub mod vault;

pub use config::{init_logging, VaultConfig};
pub use db::SqliteKeyStore;
pub use store::{KeyStore, KeyStoreError};
pub use vault::{Vault, VaultError};
