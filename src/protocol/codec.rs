//! Packet framer for the NUS RX byte stream.
//!
//! GATT writes arrive in arbitrary chunks: one packet may be split over
//! several writes, or several packets may share one.  The framer consumes
//! bytes one at a time and yields a candidate frame whenever the length
//! implied by the type byte has been collected.
//!
//! ```text
//!  Hunting ──'!'──▶ AwaitType ──type──▶ Body{expected} ──full──▶ (frame)
//!     ▲                 │                                          │
//!     └── unknown type (2-byte frame) ◀────────────────────────────┘
//! ```
//!
//! Bytes outside a packet are dropped.  An unknown type byte closes a
//! 2-byte frame immediately so the decoder rejects it and hunting resumes.

use super::packet::{PACKET_HEADER, RawFrame, packet_len};

/// Framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    /// Discarding bytes until a packet header.
    Hunting,
    /// Header seen, waiting for the type byte.
    AwaitType,
    /// Collecting the remainder of a packet of known length.
    Body { expected: usize },
}

/// Streaming packet framer.
pub struct PacketFramer {
    state: FramerState,
    buf: RawFrame,
    discarded: u32,
}

impl PacketFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Hunting,
            buf: RawFrame::new(),
            discarded: 0,
        }
    }

    /// Feed one byte.  Returns a complete candidate frame when available.
    pub fn push(&mut self, byte: u8) -> Option<RawFrame> {
        match self.state {
            FramerState::Hunting => {
                if byte == PACKET_HEADER {
                    self.start();
                } else {
                    self.discarded = self.discarded.saturating_add(1);
                }
                None
            }

            FramerState::AwaitType => {
                if byte == PACKET_HEADER {
                    // "!!": the first header was noise, restart on this one.
                    self.discarded = self.discarded.saturating_add(1);
                    self.start();
                    return None;
                }
                let _ = self.buf.push(byte);
                match packet_len(byte) {
                    Some(expected) => {
                        self.state = FramerState::Body { expected };
                        None
                    }
                    None => Some(self.finish()),
                }
            }

            FramerState::Body { expected } => {
                let _ = self.buf.push(byte);
                if self.buf.len() >= expected {
                    Some(self.finish())
                } else {
                    None
                }
            }
        }
    }

    /// Feed a chunk, handing every completed frame to `on_frame`.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(RawFrame)) {
        for &byte in data {
            if let Some(frame) = self.push(byte) {
                on_frame(frame);
            }
        }
    }

    /// Drop any partial packet (e.g. on a new connection).
    pub fn reset(&mut self) {
        self.state = FramerState::Hunting;
        self.buf.clear();
    }

    /// Bytes dropped while hunting for a header since construction.
    pub fn discarded(&self) -> u32 {
        self.discarded
    }

    /// True while a packet is partially collected.
    pub fn in_packet(&self) -> bool {
        self.state != FramerState::Hunting
    }

    fn start(&mut self) {
        self.buf.clear();
        let _ = self.buf.push(PACKET_HEADER);
        self.state = FramerState::AwaitType;
    }

    fn finish(&mut self) -> RawFrame {
        self.state = FramerState::Hunting;
        core::mem::take(&mut self.buf)
    }
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}
