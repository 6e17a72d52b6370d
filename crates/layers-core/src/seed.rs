//! Seed generation
//!
//! Generated seeds are short random strings a person can read aloud or
//! paste into an invitation.

use rand::rngs::OsRng;
use rand::Rng;

/// Alphabet for generated seeds
pub const SEED_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Length of seeds created without an explicit length
pub const DEFAULT_SEED_LENGTH: usize = 16;

/// Generate a random seed of `length` characters from [`SEED_CHARSET`].
pub fn generate_seed(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| SEED_CHARSET[rng.gen_range(0..SEED_CHARSET.len())] as char)
        .collect()
}
