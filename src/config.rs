//! System configuration parameters
//!
//! Compile-time constants shared by the rendering and drive paths, plus the
//! runtime-tunable [`RoverConfig`].  Nothing here is persisted: every boot
//! starts from [`RoverConfig::default()`].

use serde::{Deserialize, Serialize};

/// Number of pixels on the NeoPixel strip.
pub const NUM_LEDS: usize = 8;

/// Exclusive upper bound of the animation scroll offset.
pub const OFFSET_MAX: i64 = 1_000_000;

/// Brightness factor applied after gamma correction on animated frames.
pub const ANIMATION_BRIGHTNESS: f32 = 0.25;

/// Gamma exponent used by [`crate::color::gamma_adjust`].
pub const GAMMA: f32 = 2.5;

/// Divisor applied to the inner wheel during a soft turn.
pub const TURN_DIVISOR: f32 = 1.2;

/// Maximum raw frame length handed from the link to the decoder.
/// Large enough for the longest Bluefruit packet (quaternion, 19 bytes).
pub const MAX_FRAME_LEN: usize = 20;

/// Core runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoverConfig {
    // --- Link ---
    /// Prefix of the BLE advertising name (suffix is derived from the MAC)
    pub device_name_prefix: heapless::String<16>,

    // --- Main loop ---
    /// Sleep between loop iterations (milliseconds)
    pub poll_interval_ms: u32,
    /// Maximum frames drained from the link per iteration
    pub max_frames_per_iteration: u8,

    // --- Animation ---
    /// Initial scroll increment per render tick
    pub initial_offset_increment: i32,

    // --- Safety ---
    /// Stop both motors when the central disconnects
    pub stop_on_disconnect: bool,
    /// Blank the strip when the central disconnects
    pub blank_on_disconnect: bool,
}

impl Default for RoverConfig {
    fn default() -> Self {
        let mut device_name_prefix = heapless::String::new();
        let _ = device_name_prefix.push_str("rover");
        Self {
            // Link
            device_name_prefix,

            // Main loop
            poll_interval_ms: 10, // 100 Hz
            max_frames_per_iteration: 1,

            // Animation
            initial_offset_increment: 1,

            // Safety: outputs keep their last value on link loss
            stop_on_disconnect: false,
            blank_on_disconnect: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = RoverConfig::default();
        assert!(c.poll_interval_ms > 0);
        assert!(c.max_frames_per_iteration > 0);
        assert_eq!(c.initial_offset_increment, 1);
        assert_eq!(c.device_name_prefix.as_str(), "rover");
    }

    #[test]
    fn outputs_freeze_on_disconnect_by_default() {
        let c = RoverConfig::default();
        assert!(!c.stop_on_disconnect);
        assert!(!c.blank_on_disconnect);
    }

    #[test]
    fn poll_interval_is_sub_frame() {
        // A command must reach the actuators well inside one 30 Hz frame.
        let c = RoverConfig::default();
        assert!(c.poll_interval_ms < 33);
    }

    #[test]
    fn serde_roundtrip() {
        let c = RoverConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: RoverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.poll_interval_ms, c2.poll_interval_ms);
        assert_eq!(c.device_name_prefix, c2.device_name_prefix);
        assert_eq!(c.stop_on_disconnect, c2.stop_on_disconnect);
    }

    #[test]
    fn constants_are_consistent() {
        assert!(NUM_LEDS > 0);
        assert!(OFFSET_MAX > NUM_LEDS as i64);
        assert!(ANIMATION_BRIGHTNESS > 0.0 && ANIMATION_BRIGHTNESS <= 1.0);
        assert!(TURN_DIVISOR > 1.0);
    }
}
