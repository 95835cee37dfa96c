//! Fuzz target: `protocol::decode`
//!
//! Arbitrary frames must never panic the decoder, and anything it accepts
//! must re-encode to exactly the same bytes.
//!
//! cargo fuzz run fuzz_packet_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use rover::protocol::decode;

fuzz_target!(|data: &[u8]| {
    if let Ok(command) = decode(data) {
        assert_eq!(command.encode().as_slice(), data, "accepted frame is not canonical");
    }
});
