//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real GPIO, PWM or SPI.

use std::collections::VecDeque;

use rover::app::events::SessionEvent;
use rover::app::ports::{DrivePort, EventSink, LinkPort, PixelStripPort};
use rover::color::PackedColor;
use rover::config::NUM_LEDS;
use rover::error::LinkError;
use rover::protocol::RawFrame;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ChannelA(f32),
    ChannelB(f32),
    Pixel(usize, PackedColor),
    Fill(PackedColor),
    Show,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<Call>,
    pub pixels: [PackedColor; NUM_LEDS],
    pub channels: (f32, f32),
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pixels: [PackedColor::OFF; NUM_LEDS],
            channels: (0.0, 0.0),
        }
    }

    pub fn shows(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Show).count()
    }

    pub fn fills(&self) -> Vec<PackedColor> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Fill(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl DrivePort for MockHardware {
    fn set_channel_a(&mut self, throttle: f32) {
        self.channels.0 = throttle;
        self.calls.push(Call::ChannelA(throttle));
    }

    fn set_channel_b(&mut self, throttle: f32) {
        self.channels.1 = throttle;
        self.calls.push(Call::ChannelB(throttle));
    }
}

impl PixelStripPort for MockHardware {
    fn write_pixel(&mut self, index: usize, color: PackedColor) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color;
        }
        self.calls.push(Call::Pixel(index, color));
    }

    fn fill(&mut self, color: PackedColor) {
        self.pixels = [color; NUM_LEDS];
        self.calls.push(Call::Fill(color));
    }

    fn show(&mut self) {
        self.calls.push(Call::Show);
    }

    fn pixel_count(&self) -> usize {
        NUM_LEDS
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Scripted link: tests flip `connected` and queue whole frames.
pub struct MockLink {
    pub connected: bool,
    pub advertising: bool,
    pub advertise_starts: u32,
    pub frames: VecDeque<RawFrame>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            connected: false,
            advertising: false,
            advertise_starts: 0,
            frames: VecDeque::new(),
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        let mut frame = RawFrame::new();
        frame
            .extend_from_slice(bytes)
            .expect("test frame fits MAX_FRAME_LEN");
        self.frames.push_back(frame);
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPort for MockLink {
    fn start_advertising(&mut self) {
        self.advertising = true;
        self.advertise_starts += 1;
    }

    fn stop_advertising(&mut self) {
        self.advertising = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read_next_frame(&mut self) -> Result<Option<RawFrame>, LinkError> {
        if !self.connected {
            return Err(LinkError::Disconnected);
        }
        Ok(self.frames.pop_front())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SessionEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&SessionEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}
