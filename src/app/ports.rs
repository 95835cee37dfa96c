//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RoverService (domain)
//! ```
//!
//! Driven adapters (BLE link, motors, pixel strip, event sinks) implement
//! these traits.  The [`RoverService`](super::service::RoverService)
//! consumes them via generics, so the session core never touches hardware
//! directly and runs unchanged against the recording mocks in `tests/`.

use crate::color::PackedColor;
use crate::error::LinkError;
use crate::protocol::RawFrame;

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: radio ↔ domain)
// ───────────────────────────────────────────────────────────────

/// The wireless remote-control link.
///
/// Implementations own any byte-stream framing; the domain only ever sees
/// whole candidate frames.
pub trait LinkPort {
    /// Begin advertising the UART service.  Idempotent.
    fn start_advertising(&mut self);

    /// Stop advertising.  Idempotent.
    fn stop_advertising(&mut self);

    /// Whether a central is currently attached.
    fn is_connected(&self) -> bool;

    /// Next candidate frame, if one is ready.  Never blocks.
    ///
    /// `Err(LinkError::Disconnected)` when the central has gone away; the
    /// session treats it as a disconnect within the current iteration.
    fn read_next_frame(&mut self) -> Result<Option<RawFrame>, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Pixel strip port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Buffered addressable LED strip.  Writes are invisible until [`show`].
///
/// [`show`]: PixelStripPort::show
pub trait PixelStripPort {
    /// Set one pixel in the buffer.  Out-of-range indices are ignored.
    fn write_pixel(&mut self, index: usize, color: PackedColor);

    /// Set every pixel in the buffer.
    fn fill(&mut self, color: PackedColor);

    /// Transmit the buffer to the strip.
    fn show(&mut self);

    /// Number of pixels.  Bounds every render pass.
    fn pixel_count(&self) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Drive port (driven adapter: domain → motors)
// ───────────────────────────────────────────────────────────────

/// Two signed motor channels.  Values are clamped to `[-1.0, 1.0]` by the
/// implementation; `0.0` stops the channel.
pub trait DrivePort {
    fn set_channel_a(&mut self, throttle: f32);
    fn set_channel_b(&mut self, throttle: f32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`SessionEvent`](super::events::SessionEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::SessionEvent);
}
