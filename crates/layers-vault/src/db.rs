//! SQLite persistence layer.
//!
//! Keys live in a `keys` table whose autoincrement id gives the stable
//! insertion order. Singleton values (selected key, share counter) live in
//! a key-value `settings` table.

use layers_core::{generate_seed, KeyRecord, DEFAULT_SEED_LENGTH};
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Transaction};
use std::path::Path;

use crate::store::{KeyStore, KeyStoreError};

/// Key store backed by a single SQLite database.
pub struct SqliteKeyStore {
    conn: Connection,
    seed_length: usize,
}

impl SqliteKeyStore {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, KeyStoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrate(&conn)?;
        Ok(Self {
            conn,
            seed_length: DEFAULT_SEED_LENGTH,
        })
    }

    /// Throwaway store, mostly for tests.
    pub fn open_in_memory() -> Result<Self, KeyStoreError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self {
            conn,
            seed_length: DEFAULT_SEED_LENGTH,
        })
    }

    /// Length of seeds generated by [`KeyStore::create`].
    pub fn with_seed_length(mut self, seed_length: usize) -> Self {
        self.seed_length = seed_length;
        self
    }

    fn insert(&self, name: &str, seed: &str) -> Result<KeyRecord, KeyStoreError> {
        if self.get(name)?.is_some() {
            return Err(KeyStoreError::AlreadyExists(name.to_string()));
        }
        self.conn.execute(
            "INSERT INTO keys (name, seed) VALUES (?1, ?2)",
            params![name, seed],
        )?;
        Ok(KeyRecord::new(name, seed))
    }

    // ========================================================================
    // Settings helpers (key-value)
    // ========================================================================

    /// Get a setting by key.
    pub fn setting_get(&self, key: &str) -> SqlResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    /// Set a setting (upsert).
    pub fn setting_set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a setting.
    pub fn setting_delete(&self, key: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Begin a transaction on the store's connection. Store calls made
    /// before it is committed roll back together if it is dropped.
    pub fn transaction(&self) -> SqlResult<Transaction<'_>> {
        self.conn.unchecked_transaction()
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Delete every key and setting.
    pub fn reset(&self) -> SqlResult<()> {
        self.conn
            .execute_batch("DELETE FROM keys; DELETE FROM settings;")?;
        log::info!("Key store wiped");
        Ok(())
    }
}

fn migrate(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS keys (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE,
            seed  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )
}

impl KeyStore for SqliteKeyStore {
    fn list(&self) -> Result<Vec<String>, KeyStoreError> {
        let mut stmt = self.conn.prepare_cached("SELECT name FROM keys ORDER BY id")?;
        let names = stmt.query_map([], |row| row.get(0))?;
        Ok(names.collect::<SqlResult<Vec<String>>>()?)
    }

    fn get(&self, name: &str) -> Result<Option<KeyRecord>, KeyStoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, seed FROM keys WHERE name = ?1")?;
        let record = stmt
            .query_row(params![name], |row| {
                Ok(KeyRecord {
                    name: row.get(0)?,
                    seed: row.get(1)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    fn create(&self, name: &str) -> Result<KeyRecord, KeyStoreError> {
        if name.is_empty() {
            return Err(KeyStoreError::EmptyName);
        }
        let record = self.insert(name, &generate_seed(self.seed_length))?;
        log::info!("Created key '{}'", name);
        Ok(record)
    }

    fn create_imported(&self, name: &str, seed: &str) -> Result<KeyRecord, KeyStoreError> {
        if name.is_empty() {
            return Err(KeyStoreError::EmptyName);
        }
        if seed.is_empty() {
            return Err(KeyStoreError::EmptySeed);
        }
        let record = self.insert(name, seed)?;
        log::info!("Imported key '{}'", name);
        Ok(record)
    }

    fn remove(&self, name: &str) -> Result<(), KeyStoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM keys WHERE name = ?1", params![name])?;
        if affected == 0 {
            return Err(KeyStoreError::NotFound(name.to_string()));
        }
        log::info!("Removed key '{}'", name);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
