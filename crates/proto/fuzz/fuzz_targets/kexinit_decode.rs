//! Fuzz target for KEXINIT decoding.
//!
//! The decoder is the only code that reads attacker-controlled bytes, so it
//! must never panic, whatever lengths the input declares. Inputs that decode
//! must re-encode to the exact bytes they were read from.
//!
//! Run with:
//! ```bash
//! cd crates/proto
//! cargo +nightly fuzz run kexinit_decode -- -max_total_time=300
//! ```

#![no_main]
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use sshscan_proto::ssh::decoder::PAYLOAD_BEGIN;
use sshscan_proto::ssh::{KexInit, KexInitDecoder};

fuzz_target!(|data: &[u8]| {
    let Ok(mut decoder) = KexInitDecoder::new(data, "fuzz") else {
        return;
    };

    let mut kexinit = KexInit::default();
    if decoder.decode_into(&mut kexinit).is_ok() {
        let mut reencoded = BytesMut::new();
        kexinit.write_name_lists(&mut reencoded);
        // Lossy UTF-8 replaces invalid bytes, so only valid input round-trips.
        let span = &data[PAYLOAD_BEGIN..decoder.position()];
        if std::str::from_utf8(span).is_ok() {
            assert_eq!(&reencoded[..], span);
        }
    }
});
