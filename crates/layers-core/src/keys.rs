//! Seed-to-key derivation
//!
//! A seed is an opaque string. Its SHA-256 digest is used directly as the
//! AES-256 key, so every seed (the empty string included) maps to exactly
//! one key.

use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key length for AES-256-GCM (= SHA-256 digest size)
pub const KEY_LEN: usize = 32;

/// Symmetric key derived from a seed. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive the symmetric key for a seed.
///
/// Pure and deterministic. Nothing is cached: callers derive again for
/// every operation.
pub fn derive_key(seed: &str) -> DerivedKey {
    let digest = Sha256::digest(seed.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest);
    DerivedKey(key)
}

/// A named seed as held by the key store.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub name: String,
    pub seed: String,
}

impl KeyRecord {
    pub fn new(name: impl Into<String>, seed: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed: seed.into(),
        }
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("name", &self.name)
            .field("seed", &"<redacted>")
            .finish()
    }
}
