//! RoverService driven through the simulated BLE link.
//!
//! Exercises the byte-stream path: GATT writes arrive in arbitrary
//! slices and the link must hand the service whole packets.

use rover::adapters::ble::{BleLink, BleState, LinkBridge};
use rover::app::service::RoverService;
use rover::color::Rgb8;
use rover::config::RoverConfig;
use rover::fsm::StateId;
use rover::protocol::{Button, encode_button, encode_color};

use crate::mock_hw::{MockHardware, RecordingSink};

fn link() -> BleLink {
    let bridge: &'static LinkBridge = Box::leak(Box::new(LinkBridge::new()));
    let mut name = heapless::String::<24>::new();
    name.push_str("rover-itest").unwrap();
    BleLink::with_bridge(name, bridge)
}

fn rig() -> (RoverService, BleLink, MockHardware, RecordingSink) {
    let mut service = RoverService::new(RoverConfig::default());
    let mut link = link();
    let mut sink = RecordingSink::new();
    service.start(&mut link, &mut sink);
    (service, link, MockHardware::new(), sink)
}

#[test]
fn service_advertises_over_ble() {
    let (_service, link, _hw, _sink) = rig();
    assert_eq!(link.state(), BleState::Advertising);
    assert_eq!(link.device_name(), "rover-itest");
}

#[test]
fn byte_at_a_time_writes_reach_the_drive() {
    let (mut service, mut link, mut hw, mut sink) = rig();
    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Connected);

    for byte in encode_button(Button::Up, true) {
        link.sim_receive(&[byte]);
    }
    service.poll(&mut link, &mut hw, &mut sink);

    assert!(hw.channels.0 > 0.0);
    assert!(hw.channels.1 < 0.0);
    assert_eq!(service.stats().frames_decoded, 1);
}

#[test]
fn leading_noise_is_skipped() {
    let (mut service, mut link, mut hw, mut sink) = rig();
    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);

    let mut stream = b"\r\nxx".to_vec();
    stream.extend_from_slice(&encode_color(Rgb8::new(0, 0, 255)));
    link.sim_receive(&stream);
    service.poll(&mut link, &mut hw, &mut sink);

    assert!(!service.animation().is_cycling());
    assert_eq!(service.stats().frames_rejected, 0);
}

#[test]
fn coalesced_writes_are_spread_over_iterations() {
    let (mut service, mut link, mut hw, mut sink) = rig();
    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);

    let mut stream = encode_button(Button::Left, true).to_vec();
    stream.extend_from_slice(&encode_button(Button::Left, false));
    link.sim_receive(&stream);

    service.poll(&mut link, &mut hw, &mut sink);
    assert_ne!(hw.channels, (0.0, 0.0));
    service.poll(&mut link, &mut hw, &mut sink);
    assert_eq!(hw.channels, (0.0, 0.0));
}

#[test]
fn unseen_connection_still_readvertises() {
    let (mut service, mut link, mut hw, mut sink) = rig();
    service.poll(&mut link, &mut hw, &mut sink);

    // Attach and drop between two iterations.
    link.sim_connect();
    assert_ne!(link.state(), BleState::Advertising);
    link.sim_disconnect();
    service.poll(&mut link, &mut hw, &mut sink);

    assert_eq!(service.state(), StateId::Advertising);
    assert_eq!(service.sessions(), 0);
    assert_eq!(link.state(), BleState::Advertising);

    // The next central is picked up normally.
    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Connected);
}

#[test]
fn partial_packet_does_not_survive_reconnect() {
    let (mut service, mut link, mut hw, mut sink) = rig();
    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);

    let up = encode_button(Button::Up, true);
    link.sim_receive(&up[..3]);
    service.poll(&mut link, &mut hw, &mut sink);

    link.sim_disconnect();
    service.poll(&mut link, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Advertising);
    assert_eq!(link.state(), BleState::Advertising);

    link.sim_connect();
    service.poll(&mut link, &mut hw, &mut sink);
    // Tail of the old packet followed by a fresh one.
    link.sim_receive(&up[3..]);
    link.sim_receive(&encode_button(Button::Down, true));
    service.poll(&mut link, &mut hw, &mut sink);

    assert!(hw.channels.0 < 0.0, "only the Down press should land");
    assert_eq!(service.stats().frames_decoded, 1);
    assert_eq!(service.sessions(), 2);
}
