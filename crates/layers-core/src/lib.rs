//! Layers Core
//!
//! Seed-derived message encryption for Layers.
//!
//! # Keys
//!
//! A key is a named seed string. The seed is hashed with SHA-256 and the
//! digest is the AES-256-GCM key.
//!
//! # Envelopes
//!
//! Messages are sealed into `base64(nonce || ciphertext || tag)`.
//!
//! # Resolution
//!
//! Given some input and the user's keys, [`resolve`] opens it with the first
//! key that can, or encrypts it under the active key when none can.

pub mod crypto;
pub mod keys;
pub mod resolve;
pub mod seed;

pub use crypto::{decode, encode, DecodeError, EncodeError, Envelope};
pub use keys::{derive_key, DerivedKey, KeyRecord};
pub use resolve::{resolve, resolve_concurrent, Resolution};
pub use seed::{generate_seed, DEFAULT_SEED_LENGTH};
