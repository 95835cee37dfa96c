//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing session events to the ESP-IDF
//! logger (UART / USB-CDC in production, stderr on the host).

use log::{debug, info};

use crate::app::events::SessionEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SessionEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            SessionEvent::Connected { session } => {
                info!("LINK | session {} up", session);
            }
            SessionEvent::Disconnected(stats) => {
                info!(
                    "LINK | down | decoded={} rejected={} renders={} sessions={}",
                    stats.frames_decoded,
                    stats.frames_rejected,
                    stats.render_ticks,
                    stats.sessions_completed,
                );
            }
            SessionEvent::FrameRejected { len } => {
                debug!("RX | rejected {}-byte frame", len);
            }
            SessionEvent::ThrottleChanged(level) => {
                info!("DRIVE | {}", level.name());
            }
            SessionEvent::PaletteSelected(id) => {
                info!("LED | palette {}", id.palette().name);
            }
            SessionEvent::SolidColor(c) => {
                info!("LED | solid #{:02x}{:02x}{:02x}", c.r, c.g, c.b);
            }
        }
    }
}
