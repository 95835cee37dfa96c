//! Error types for the rover firmware.
//!
//! Both kinds are `Copy` so they pass through the session core without
//! allocation.  Neither is fatal: the main loop logs and carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// The frame matched neither the button nor the colour shape.
///
/// Recoverable: the caller discards the frame and keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Unrecognized,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "unrecognized frame"),
        }
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Recoverable: the session returns to advertising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    Disconnected,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "central disconnected"),
        }
    }
}
