#![no_main]

use libfuzzer_sys::fuzz_target;
use layers_core::{decode, Envelope};

fuzz_target!(|data: &[u8]| {
    // Envelope parsing must never panic, whatever the bytes.
    if let Ok(envelope) = Envelope::from_bytes(data) {
        assert_eq!(envelope.to_bytes(), data);
    }

    // Same for the text path, including the resolver's decode attempt.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Envelope::from_text(text);
        let _ = decode(text, "fuzz-seed");
    }
});
