//! Outbound session events.
//!
//! The [`RoverService`](super::service::RoverService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::color::Rgb8;
use crate::control::drive::ThrottleLevel;
use crate::fsm::StateId;
use crate::palette::PaletteId;

/// Structured events emitted by the session core.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// A central attached.  Carries the 1-based session number.
    Connected { session: u32 },

    /// The central went away.  Carries the counters at that moment.
    Disconnected(SessionStats),

    /// A frame failed to decode and was discarded.
    FrameRejected { len: usize },

    ThrottleChanged(ThrottleLevel),

    PaletteSelected(PaletteId),

    /// The strip was filled with a solid colour; cycling is paused.
    SolidColor(Rgb8),
}

/// Running counters, cumulative since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_decoded: u32,
    pub frames_rejected: u32,
    pub render_ticks: u32,
    /// Connections that have ended.
    pub sessions_completed: u32,
}
