//! Fuzz target: `PacketFramer::feed`
//!
//! Drives arbitrary byte streams through the framer and the decoder and
//! asserts frames are well-formed and the framer recovers after a reset.
//!
//! cargo fuzz run fuzz_packet_framer

#![no_main]

use libfuzzer_sys::fuzz_target;
use rover::protocol::{PacketFramer, decode};

fuzz_target!(|data: &[u8]| {
    let mut framer = PacketFramer::new();
    framer.feed(data, |frame| {
        assert!(frame.len() >= 2, "framer yielded a headless frame");
        assert_eq!(frame[0], b'!');
        let _ = decode(&frame);
    });

    framer.reset();
    assert!(!framer.in_packet());
    framer.feed(data, |_| {});
});
