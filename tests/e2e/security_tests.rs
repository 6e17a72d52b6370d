//! Security-specific tests.
//!
//! These tests verify:
//! 1. Envelopes reject the wrong seed and any modification
//! 2. Malformed inputs don't panic
//! 3. The resolver never attributes a message to the wrong key

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use layers_core::crypto::{NONCE_LEN, TAG_LEN};
use layers_core::{decode, encode, resolve, DecodeError, Envelope, KeyRecord, Resolution};
use rand::{Rng, RngCore};

// ============================================================================
// 1. Envelope Security Tests
// ============================================================================

#[test]
fn test_wrong_seed_fails_decryption() {
    let envelope = encode("secret", "correct horse battery staple").unwrap();
    let result = decode(&envelope, "wrong horse battery staple");

    assert_eq!(
        result,
        Err(DecodeError::AuthenticationFailed),
        "Decryption with wrong seed should fail"
    );
}

#[test]
fn test_near_miss_seeds_fail() {
    let envelope = encode("secret", "Seed").unwrap();

    for wrong in ["seed", "Seed ", " Seed", "Seed\n", "Seeed", ""] {
        assert!(decode(&envelope, wrong).is_err(), "seed {:?} opened it", wrong);
    }
    assert_eq!(decode(&envelope, "Seed").unwrap(), "secret");
}

#[test]
fn test_random_bit_flips_detected() {
    let mut rng = rand::thread_rng();
    let text = encode("the eagle lands at midnight", "seed").unwrap();
    let bytes = Envelope::from_text(&text).unwrap().to_bytes();

    for _ in 0..200 {
        let mut tampered = bytes.clone();
        let idx = rng.gen_range(0..tampered.len());
        let bit = 1u8 << rng.gen_range(0..8);
        tampered[idx] ^= bit;

        let result = decode(&STANDARD.encode(&tampered), "seed");
        assert_eq!(
            result,
            Err(DecodeError::AuthenticationFailed),
            "Flip of bit {:#04x} in byte {} went undetected",
            bit,
            idx
        );
    }
}

#[test]
fn test_truncated_envelope_fails() {
    let text = encode("truncate me", "seed").unwrap();
    let bytes = Envelope::from_text(&text).unwrap().to_bytes();

    // Dropping any suffix, including the whole tag, must fail
    for len in NONCE_LEN..bytes.len() {
        let truncated = STANDARD.encode(&bytes[..len]);
        assert_eq!(
            decode(&truncated, "seed"),
            Err(DecodeError::AuthenticationFailed),
            "Truncation to {} bytes accepted",
            len
        );
    }
    for len in 0..NONCE_LEN {
        let truncated = STANDARD.encode(&bytes[..len]);
        assert_eq!(decode(&truncated, "seed"), Err(DecodeError::Malformed));
    }
}

#[test]
fn test_extended_envelope_fails() {
    let text = encode("extend me", "seed").unwrap();
    let mut bytes = Envelope::from_text(&text).unwrap().to_bytes();
    bytes.push(0x00);

    assert_eq!(
        decode(&STANDARD.encode(&bytes), "seed"),
        Err(DecodeError::AuthenticationFailed)
    );
}

#[test]
fn test_spliced_envelopes_fail() {
    // Nonce from one envelope, ciphertext from another
    let a = Envelope::from_text(&encode("message one", "seed").unwrap()).unwrap();
    let b = Envelope::from_text(&encode("message two", "seed").unwrap()).unwrap();

    let mut spliced = a.nonce().to_vec();
    spliced.extend_from_slice(b.ciphertext());

    assert_eq!(
        decode(&STANDARD.encode(&spliced), "seed"),
        Err(DecodeError::AuthenticationFailed)
    );
}

#[test]
fn test_nonces_never_repeat() {
    let mut nonces = std::collections::HashSet::new();
    for _ in 0..500 {
        let envelope = Envelope::from_text(&encode("same", "same").unwrap()).unwrap();
        assert!(nonces.insert(*envelope.nonce()), "Nonce reused");
    }
}

#[test]
fn test_ciphertext_length_hides_only_content() {
    // GCM does not pad: length = nonce + message + tag
    let envelope = Envelope::from_text(&encode("12345", "seed").unwrap()).unwrap();
    assert_eq!(envelope.to_bytes().len(), NONCE_LEN + 5 + TAG_LEN);
}

// ============================================================================
// 2. Malformed Input Tests
// ============================================================================

#[test]
fn test_random_bytes_never_panic() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let len = rng.gen_range(0..128);
        let mut data = vec![0u8; len];
        rng.fill_bytes(&mut data);

        let _ = Envelope::from_bytes(&data);
        let result = decode(&STANDARD.encode(&data), "seed");
        assert!(result.is_err());
    }
}

#[test]
fn test_random_text_never_panics() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let len = rng.gen_range(0..64);
        let text: String = (0..len).map(|_| rng.gen::<char>()).collect();
        assert!(decode(&text, "seed").is_err());
    }
}

#[test]
fn test_non_alphabet_characters_malformed() {
    let envelope = encode("hello", "seed").unwrap();

    for bad in ['-', '_', ' ', '\n', '.', 'é'] {
        let mut corrupted = envelope.clone();
        corrupted.insert(4, bad);
        assert_eq!(
            decode(&corrupted, "seed"),
            Err(DecodeError::Malformed),
            "char {:?} accepted",
            bad
        );
    }
}

// ============================================================================
// 3. Resolver Attribution Tests
// ============================================================================

fn ring(n: usize) -> Vec<KeyRecord> {
    (0..n)
        .map(|i| KeyRecord::new(format!("key-{}", i), format!("seed-{}", i)))
        .collect()
}

#[test]
fn test_resolver_attributes_to_sealing_key() {
    let keys = ring(8);
    let active = &keys[0];

    for (i, sealer) in keys.iter().enumerate() {
        let envelope = encode(&format!("from {}", i), &sealer.seed).unwrap();
        let result = resolve(&envelope, active, &keys[1..]).unwrap();

        assert_eq!(result.matched_name(), Some(sealer.name.as_str()));
        assert_eq!(result.output(), format!("from {}", i));
    }
}

#[test]
fn test_resolver_never_decrypts_plaintext() {
    let mut rng = rand::thread_rng();
    let keys = ring(4);

    for _ in 0..100 {
        let len = rng.gen_range(1..40);
        let input: String = (0..len)
            .map(|_| rng.gen_range(b'!'..=b'~') as char)
            .collect();

        let result = resolve(&input, &keys[0], &keys[1..]).unwrap();
        let Resolution::Encrypted { envelope } = result else {
            panic!("plaintext {:?} was decrypted", input);
        };
        assert_eq!(decode(&envelope, &keys[0].seed).unwrap(), input);
    }
}
