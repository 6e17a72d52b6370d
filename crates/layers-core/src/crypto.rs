//! Message envelopes
//!
//! Seed-keyed encryption of text messages using SHA-256 + AES-256-GCM.
//!
//! # Envelope format
//!
//! ```text
//! base64( nonce (12 bytes) || ciphertext || tag (16 bytes) )
//! ```
//!
//! Standard alphabet, padded, no line wraps. Because GCM authenticates the
//! ciphertext, a wrong seed, a corrupted envelope and text that never was
//! an envelope all fail the same way: the tag does not verify.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::keys::{derive_key, DerivedKey};

/// Nonce length for AES-256-GCM
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length
pub const TAG_LEN: usize = 16;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed envelope")]
    Malformed,
    #[error("Authentication failed: wrong key or corrupted envelope")]
    AuthenticationFailed,
}

/// Encryption failures. There is no fallback for these: without
/// randomness no envelope can be produced safely.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
}

/// Binary envelope: nonce + ciphertext with trailing tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize to bytes: nonce || ciphertext
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < NONCE_LEN {
            return Err(DecodeError::Malformed);
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);

        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_LEN..].to_vec(),
        })
    }

    /// Text form for transport (standard base64)
    pub fn to_text(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the text form. Anything outside the base64 alphabet is malformed.
    pub fn from_text(text: &str) -> Result<Self, DecodeError> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|_| DecodeError::Malformed)?;
        Self::from_bytes(&bytes)
    }

    fn seal(plaintext: &[u8], key: &DerivedKey) -> Result<Self, EncodeError> {
        // Fresh nonce for every message
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| EncodeError::Entropy(e.to_string()))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| EncodeError::Encryption(e.to_string()))?;

        Ok(Self { nonce, ciphertext })
    }

    fn open(&self, key: &DerivedKey) -> Result<Vec<u8>, DecodeError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map_err(|_| DecodeError::AuthenticationFailed)
    }
}

/// Encrypt a message under a seed and return the envelope text.
///
/// Each call draws a new random nonce, so encoding the same message twice
/// gives two different envelopes.
pub fn encode(plaintext: &str, seed: &str) -> Result<String, EncodeError> {
    let key = derive_key(seed);
    let envelope = Envelope::seal(plaintext.as_bytes(), &key)?;
    Ok(envelope.to_text())
}

/// Decrypt envelope text with a seed.
///
/// # Errors
/// - [`DecodeError::Malformed`] if the text is not base64 or is shorter
///   than a nonce
/// - [`DecodeError::AuthenticationFailed`] if the tag does not verify
pub fn decode(envelope_text: &str, seed: &str) -> Result<String, DecodeError> {
    let envelope = Envelope::from_text(envelope_text)?;
    let key = derive_key(seed);
    let plaintext = envelope.open(&key)?;

    // Authentic envelopes from `encode` are always UTF-8. Anything else was
    // sealed by another producer holding the same seed; decode it lossily.
    Ok(String::from_utf8(plaintext).unwrap_or_else(|e| {
        log::warn!("Authenticated envelope carried invalid UTF-8, decoding lossily");
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    }))
}
