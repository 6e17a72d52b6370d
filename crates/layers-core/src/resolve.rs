//! Multi-key resolution
//!
//! Decides whether an input is an envelope one of the user's keys can open,
//! or new plaintext to encrypt.
//!
//! # Policy
//!
//! 1. Try the active key.
//! 2. Try the remaining keys in store order. The first one that opens the
//!    envelope wins and scanning stops.
//! 3. If no key opens it, encrypt the input under the active key.
//!
//! Decode failures are expected here and never surface: a wrong key, a
//! corrupted envelope and plain text all fall through to encryption. Only
//! encryption failures are returned to the caller.

use std::sync::Arc;

use crate::crypto::{decode, encode, EncodeError};
use crate::keys::KeyRecord;

/// Outcome of resolving one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The input was an envelope; `matched_name` is the key that opened it.
    Decrypted {
        plaintext: String,
        matched_name: String,
    },
    /// The input was treated as plaintext and sealed under the active key.
    Encrypted { envelope: String },
}

impl Resolution {
    pub fn is_decrypted(&self) -> bool {
        matches!(self, Self::Decrypted { .. })
    }

    /// The text to show the user: plaintext or envelope.
    pub fn output(&self) -> &str {
        match self {
            Self::Decrypted { plaintext, .. } => plaintext,
            Self::Encrypted { envelope } => envelope,
        }
    }

    /// Name of the key that opened the input, if any.
    pub fn matched_name(&self) -> Option<&str> {
        match self {
            Self::Decrypted { matched_name, .. } => Some(matched_name),
            Self::Encrypted { .. } => None,
        }
    }
}

/// Keys in the order they are tried: active first, then the candidates.
///
/// A candidate sharing the active key's name is skipped, so callers may pass
/// the full store listing.
fn attempt_order<'a>(
    active: &'a KeyRecord,
    candidates: &'a [KeyRecord],
) -> impl Iterator<Item = &'a KeyRecord> {
    std::iter::once(active).chain(
        candidates
            .iter()
            .filter(move |record| record.name != active.name),
    )
}

fn encrypt_fallback(input: &str, active: &KeyRecord) -> Result<Resolution, EncodeError> {
    log::debug!("No key opened the input, encrypting under '{}'", active.name);
    Ok(Resolution::Encrypted {
        envelope: encode(input, &active.seed)?,
    })
}

/// Resolve `input` against the active key and the ordered candidates.
///
/// The caller must not pass an input that is empty after trimming.
pub fn resolve(
    input: &str,
    active: &KeyRecord,
    candidates: &[KeyRecord],
) -> Result<Resolution, EncodeError> {
    for record in attempt_order(active, candidates) {
        match decode(input, &record.seed) {
            Ok(plaintext) => {
                log::debug!("Input opened with key '{}'", record.name);
                return Ok(Resolution::Decrypted {
                    plaintext,
                    matched_name: record.name.clone(),
                });
            }
            Err(e) => log::debug!("Key '{}' did not open input: {}", record.name, e),
        }
    }

    encrypt_fallback(input, active)
}

/// Same policy as [`resolve`], with every decode attempt running
/// concurrently on the tokio blocking pool.
///
/// Results are inspected in attempt order, so the winner is the lowest
/// index that succeeded, not whichever attempt finished first. Must be
/// called from within a tokio runtime.
pub async fn resolve_concurrent(
    input: &str,
    active: &KeyRecord,
    candidates: &[KeyRecord],
) -> Result<Resolution, EncodeError> {
    let shared: Arc<str> = Arc::from(input);

    let attempts: Vec<_> = attempt_order(active, candidates)
        .map(|record| {
            let input = Arc::clone(&shared);
            let seed = record.seed.clone();
            let handle = tokio::task::spawn_blocking(move || decode(&input, &seed));
            (record.name.clone(), handle)
        })
        .collect();

    for (name, handle) in attempts {
        match handle.await {
            Ok(Ok(plaintext)) => {
                log::debug!("Input opened with key '{}'", name);
                return Ok(Resolution::Decrypted {
                    plaintext,
                    matched_name: name,
                });
            }
            Ok(Err(e)) => log::debug!("Key '{}' did not open input: {}", name, e),
            Err(e) => log::warn!("Decode attempt for key '{}' aborted: {}", name, e),
        }
    }

    encrypt_fallback(input, active)
}
