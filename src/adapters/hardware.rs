//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns both motor drivers and the NeoPixel strip, exposing them through
//! [`DrivePort`] and [`PixelStripPort`].  On non-espidf targets the motor
//! drivers use cfg-gated simulation stubs and the strip writes to whatever
//! [`SpiBus`] it was given.

use embedded_hal::spi::SpiBus;
use log::warn;

use crate::app::ports::{DrivePort, PixelStripPort};
use crate::color::PackedColor;
use crate::drivers::motor::{MotorChannel, MotorDriver};
use crate::drivers::neopixel::NeoPixelStrip;

/// Concrete adapter that combines all actuators behind port traits.
pub struct HardwareAdapter<SPI> {
    motor_a: MotorDriver,
    motor_b: MotorDriver,
    strip: NeoPixelStrip<SPI>,
    show_errors: u32,
}

impl<SPI: SpiBus<u8>> HardwareAdapter<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self {
            motor_a: MotorDriver::new(MotorChannel::A),
            motor_b: MotorDriver::new(MotorChannel::B),
            strip: NeoPixelStrip::new(spi),
            show_errors: 0,
        }
    }

    pub fn motor_a(&self) -> &MotorDriver {
        &self.motor_a
    }

    pub fn motor_b(&self) -> &MotorDriver {
        &self.motor_b
    }

    pub fn strip(&self) -> &NeoPixelStrip<SPI> {
        &self.strip
    }

    /// Failed strip transmissions since boot.
    pub fn show_errors(&self) -> u32 {
        self.show_errors
    }
}

// ── DrivePort implementation ──────────────────────────────────

impl<SPI: SpiBus<u8>> DrivePort for HardwareAdapter<SPI> {
    fn set_channel_a(&mut self, throttle: f32) {
        self.motor_a.set_throttle(throttle);
    }

    fn set_channel_b(&mut self, throttle: f32) {
        self.motor_b.set_throttle(throttle);
    }
}

// ── PixelStripPort implementation ─────────────────────────────

impl<SPI: SpiBus<u8>> PixelStripPort for HardwareAdapter<SPI> {
    fn write_pixel(&mut self, index: usize, color: PackedColor) {
        self.strip.set(index, color);
    }

    fn fill(&mut self, color: PackedColor) {
        self.strip.fill(color);
    }

    fn show(&mut self) {
        if let Err(e) = self.strip.show() {
            self.show_errors = self.show_errors.wrapping_add(1);
            warn!("strip: SPI write failed ({:?})", e);
        }
    }

    fn pixel_count(&self) -> usize {
        self.strip.len()
    }
}
