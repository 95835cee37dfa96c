//! End-to-end session tests: RoverService against the mock adapters.

use rover::app::events::SessionEvent;
use rover::app::service::RoverService;
use rover::color::{PackedColor, Rgb8};
use rover::config::{NUM_LEDS, RoverConfig};
use rover::control::drive::ThrottleLevel;
use rover::fsm::StateId;
use rover::palette::PaletteId;
use rover::protocol::{Button, encode_button, encode_color};

use crate::mock_hw::{Call, MockHardware, MockLink, RecordingSink};

struct Rig {
    service: RoverService,
    link: MockLink,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(RoverConfig::default())
    }

    fn with_config(config: RoverConfig) -> Self {
        let mut rig = Self {
            service: RoverService::new(config),
            link: MockLink::new(),
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
        };
        rig.service.start(&mut rig.link, &mut rig.sink);
        rig
    }

    fn poll(&mut self) {
        self.service.poll(&mut self.link, &mut self.hw, &mut self.sink);
    }

    fn connect(&mut self) {
        self.link.connected = true;
        self.poll();
    }

    fn send(&mut self, bytes: &[u8]) {
        self.link.push(bytes);
        self.poll();
    }
}

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn boots_advertising_once() {
    let mut rig = Rig::new();
    assert_eq!(rig.service.state(), StateId::Advertising);
    assert!(rig.link.advertising);
    for _ in 0..5 {
        rig.poll();
    }
    assert_eq!(rig.link.advertise_starts, 1);
    assert_eq!(rig.sink.events[0], SessionEvent::Started(StateId::Advertising));
}

#[test]
fn nothing_renders_while_advertising() {
    let mut rig = Rig::new();
    rig.link.push(&encode_button(Button::Up, true));
    for _ in 0..10 {
        rig.poll();
    }
    assert!(rig.hw.calls.is_empty());
    // The frame waits in the link until a central is attached.
    assert_eq!(rig.link.frames.len(), 1);
}

#[test]
fn connect_stops_advertising_and_starts_rendering() {
    let mut rig = Rig::new();
    rig.connect();
    assert_eq!(rig.service.state(), StateId::Connected);
    assert!(!rig.link.advertising);
    assert_eq!(rig.service.sessions(), 1);
    assert_eq!(rig.hw.shows(), 1);
    assert!(rig.sink.events.contains(&SessionEvent::Connected { session: 1 }));
}

// ── Scenario: Up pressed ──────────────────────────────────────

#[test]
fn up_press_drives_forward_and_speeds_up_animation() {
    let mut rig = Rig::new();
    rig.connect();
    let before = rig.service.animation().offset_increment();

    rig.send(&encode_button(Button::Up, true));

    let m = ThrottleLevel::Half.magnitude();
    assert_close(rig.hw.channels.0, m);
    assert_close(rig.hw.channels.1, -m);
    assert!(rig.service.animation().is_cycling());
    assert_eq!(rig.service.animation().offset_increment(), before + 1);
}

#[test]
fn dispatch_lands_before_render_in_same_iteration() {
    let mut rig = Rig::new();
    rig.connect();
    rig.hw.clear();

    rig.send(&encode_button(Button::Up, true));

    let first_pixel = rig
        .hw
        .calls
        .iter()
        .position(|c| matches!(c, Call::Pixel(..)))
        .unwrap();
    let last_drive = rig
        .hw
        .calls
        .iter()
        .rposition(|c| matches!(c, Call::ChannelA(_) | Call::ChannelB(_)))
        .unwrap();
    assert!(last_drive < first_pixel);
}

// ── Scenario: release ─────────────────────────────────────────

#[test]
fn any_release_stops_both_channels() {
    for button in Button::ALL {
        let mut rig = Rig::new();
        rig.connect();
        rig.send(&encode_button(Button::Right, true));
        assert_ne!(rig.hw.channels, (0.0, 0.0));

        rig.send(&encode_button(button, false));
        assert_eq!(rig.hw.channels, (0.0, 0.0), "release of {button:?}");
    }
}

#[test]
fn turns_soften_inner_wheel() {
    let mut rig = Rig::new();
    rig.connect();
    let m = ThrottleLevel::Half.magnitude();

    rig.send(&encode_button(Button::Left, true));
    assert_close(rig.hw.channels.0, m);
    assert_close(rig.hw.channels.1, -m / 1.2);

    rig.send(&encode_button(Button::Right, true));
    assert_close(rig.hw.channels.0, m / 1.2);
    assert_close(rig.hw.channels.1, -m);
}

// ── Scenario: colour ──────────────────────────────────────────

#[test]
fn color_frame_fills_strip_and_pauses_animation() {
    let mut rig = Rig::new();
    rig.connect();
    rig.hw.clear();

    rig.send(&encode_color(Rgb8::new(255, 0, 0)));

    assert!(!rig.service.animation().is_cycling());
    assert_eq!(rig.hw.fills(), vec![PackedColor(0x00FF_0000)]);
    assert_eq!(rig.hw.pixels, [PackedColor(0x00FF_0000); NUM_LEDS]);
    assert!(rig.sink.events.contains(&SessionEvent::SolidColor(Rgb8::new(255, 0, 0))));

    // Paused: further polls leave the strip alone.
    rig.hw.clear();
    for _ in 0..5 {
        rig.poll();
    }
    assert!(rig.hw.calls.is_empty());

    // Any button frame resumes cycling.
    rig.send(&encode_button(Button::Button2, false));
    assert!(rig.service.animation().is_cycling());
    assert_eq!(rig.hw.shows(), 1);
}

// ── Scenario: unrecognised frame ──────────────────────────────

#[test]
fn garbage_frame_changes_nothing() {
    let mut rig = Rig::new();
    rig.connect();
    rig.send(&encode_button(Button::Up, true));
    let channels = rig.hw.channels;
    let offset = rig.service.animation().offset();
    let increment = rig.service.animation().offset_increment();
    let palette = rig.service.animation().palette();
    let renders = rig.service.stats().render_ticks;
    rig.hw.clear();

    let mut corrupt = encode_button(Button::Down, true);
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xFF;
    rig.send(&corrupt);
    rig.send(b"!Q");
    rig.send(b"!Zjunk");

    assert_eq!(rig.hw.channels, channels);
    assert_eq!(rig.service.animation().offset(), offset);
    assert_eq!(rig.service.animation().offset_increment(), increment);
    assert_eq!(rig.service.animation().palette(), palette);
    assert!(rig.hw.calls.is_empty(), "strip touched: {:?}", rig.hw.calls);
    assert_eq!(rig.service.stats().render_ticks, renders);
    assert_eq!(rig.service.stats().frames_rejected, 3);
    assert_eq!(rig.sink.count(|e| matches!(e, SessionEvent::FrameRejected { .. })), 3);
    assert_eq!(rig.service.state(), StateId::Connected);

    // The animation picks up again on the next clean iteration.
    rig.poll();
    assert_eq!(rig.service.animation().offset(), offset + increment);
    assert_eq!(rig.hw.shows(), 1);
}

// ── Presets ───────────────────────────────────────────────────

#[test]
fn numbered_buttons_select_throttle_and_palette() {
    let cases = [
        (Button::Button1, ThrottleLevel::Full, PaletteId::Rainbow),
        (Button::Button2, ThrottleLevel::Third, PaletteId::Gradient),
        (Button::Button3, ThrottleLevel::Half, PaletteId::Fire),
        (Button::Button4, ThrottleLevel::Low, PaletteId::Water),
    ];
    for (button, level, palette) in cases {
        let mut rig = Rig::new();
        rig.connect();
        rig.send(&encode_button(button, true));
        assert_eq!(rig.service.drive().throttle(), level);
        assert_eq!(rig.service.animation().palette(), palette);
        assert!(rig.sink.events.contains(&SessionEvent::ThrottleChanged(level)));
        assert!(rig.sink.events.contains(&SessionEvent::PaletteSelected(palette)));
    }
}

#[test]
fn throttle_change_applies_on_next_move() {
    let mut rig = Rig::new();
    rig.connect();
    rig.send(&encode_button(Button::Up, true));
    rig.send(&encode_button(Button::Button1, true));
    // Motors keep their speed until the next movement command.
    assert_close(rig.hw.channels.0, ThrottleLevel::Half.magnitude());

    rig.send(&encode_button(Button::Up, true));
    assert_close(rig.hw.channels.0, 1.0);
    assert_close(rig.hw.channels.1, -1.0);
}

// ── Scenario: disconnect ──────────────────────────────────────

#[test]
fn disconnect_returns_to_advertising_and_freezes_outputs() {
    let mut rig = Rig::new();
    rig.connect();
    rig.send(&encode_button(Button::Up, true));
    let channels = rig.hw.channels;
    let pixels = rig.hw.pixels;
    rig.hw.clear();

    rig.link.connected = false;
    rig.poll();

    assert_eq!(rig.service.state(), StateId::Advertising);
    assert!(rig.link.advertising);
    assert_eq!(rig.link.advertise_starts, 2);
    assert!(rig.hw.calls.is_empty());
    assert_eq!(rig.hw.channels, channels);
    assert_eq!(rig.hw.pixels, pixels);

    let stats = rig.service.stats();
    assert_eq!(stats.sessions_completed, 1);
    assert!(rig.sink.events.contains(&SessionEvent::Disconnected(stats)));
}

#[test]
fn disconnect_can_halt_outputs_when_configured() {
    let config = RoverConfig {
        stop_on_disconnect: true,
        blank_on_disconnect: true,
        ..RoverConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.connect();
    rig.send(&encode_button(Button::Down, true));
    rig.hw.clear();

    rig.link.connected = false;
    rig.poll();

    assert_eq!(rig.hw.channels, (0.0, 0.0));
    assert_eq!(rig.hw.fills(), vec![PackedColor::OFF]);
    assert_eq!(rig.hw.shows(), 1);
}

#[test]
fn reconnect_starts_a_new_session_with_state_kept() {
    let mut rig = Rig::new();
    rig.connect();
    rig.send(&encode_button(Button::Button4, true));
    rig.link.connected = false;
    rig.poll();

    rig.connect();
    assert_eq!(rig.service.sessions(), 2);
    assert_eq!(rig.service.drive().throttle(), ThrottleLevel::Low);
    assert_eq!(rig.service.animation().palette(), PaletteId::Water);
    assert!(rig.sink.events.contains(&SessionEvent::Connected { session: 2 }));
}

#[test]
fn frames_drain_one_per_iteration_by_default() {
    let mut rig = Rig::new();
    rig.connect();
    rig.link.push(&encode_button(Button::Up, true));
    rig.link.push(&encode_button(Button::Up, false));

    rig.poll();
    assert_ne!(rig.hw.channels, (0.0, 0.0));
    rig.poll();
    assert_eq!(rig.hw.channels, (0.0, 0.0));
    assert_eq!(rig.service.stats().frames_decoded, 2);
}

#[test]
fn configured_batch_drains_several_frames() {
    let config = RoverConfig {
        max_frames_per_iteration: 4,
        ..RoverConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.connect();
    for _ in 0..3 {
        rig.link.push(&encode_button(Button::Up, true));
    }
    rig.poll();
    assert!(rig.link.frames.is_empty());
    assert_eq!(rig.service.animation().offset_increment(), 4);
    // Still exactly one render per iteration.
    assert_eq!(rig.hw.shows(), 2);
}
