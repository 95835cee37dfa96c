//! WS2812B NeoPixel strip driven through an SPI MOSI line.
//!
//! Each WS2812 data bit becomes four SPI bits at 3.2 MHz (one WS2812 bit
//! every 1.25 µs): `1000` encodes a 0, `1110` encodes a 1.  Two data bits
//! pack into one SPI byte, so a 24-bit GRB pixel costs 12 SPI bytes.
//!
//! ```text
//!  pixel (0xRRGGBB) ──GRB──▶ [g][r][b] ──2 bits/byte──▶ 12 SPI bytes
//!  frame = NUM_LEDS × 12 bytes ++ RESET_LEN zero bytes (latch)
//! ```
//!
//! The driver is generic over [`embedded_hal::spi::SpiBus`]: esp-idf-hal's
//! `SpiBusDriver` on target, a recording mock in tests.

use embedded_hal::spi::SpiBus;

use crate::color::PackedColor;
use crate::config::NUM_LEDS;

/// SPI byte for each 2-bit group, MSB first.
const PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

/// SPI bytes per pixel (24 data bits, 2 per SPI byte).
pub const BYTES_PER_PIXEL: usize = 12;

/// Low time after the last pixel: 140 bytes at 3.2 MHz is 350 µs, above
/// the WS2812B latch threshold.
pub const RESET_LEN: usize = 140;

pub const FRAME_LEN: usize = NUM_LEDS * BYTES_PER_PIXEL + RESET_LEN;

/// Expand one colour byte into four SPI bytes.
fn encode_byte(mut value: u8, out: &mut [u8]) {
    for slot in out.iter_mut().take(4) {
        *slot = PATTERNS[((value & 0b1100_0000) >> 6) as usize];
        value <<= 2;
    }
}

/// Encode one pixel into its 12-byte SPI chunk, GRB order.
pub fn encode_pixel(color: PackedColor, out: &mut [u8; BYTES_PER_PIXEL]) {
    encode_byte(color.g(), &mut out[0..4]);
    encode_byte(color.r(), &mut out[4..8]);
    encode_byte(color.b(), &mut out[8..12]);
}

pub struct NeoPixelStrip<SPI> {
    spi: SPI,
    pixels: [PackedColor; NUM_LEDS],
    tx: [u8; FRAME_LEN],
    frames_sent: u32,
}

impl<SPI: SpiBus<u8>> NeoPixelStrip<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            pixels: [PackedColor::OFF; NUM_LEDS],
            tx: [0; FRAME_LEN],
            frames_sent: 0,
        }
    }

    /// Buffer one pixel.  Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, color: PackedColor) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color;
        }
    }

    pub fn fill(&mut self, color: PackedColor) {
        self.pixels = [color; NUM_LEDS];
    }

    /// Encode the buffer and push it out over SPI.
    pub fn show(&mut self) -> Result<(), SPI::Error> {
        for (i, &pixel) in self.pixels.iter().enumerate() {
            let start = i * BYTES_PER_PIXEL;
            let mut chunk = [0u8; BYTES_PER_PIXEL];
            encode_pixel(pixel, &mut chunk);
            self.tx[start..start + BYTES_PER_PIXEL].copy_from_slice(&chunk);
        }
        // Reset tail stays zero from construction.
        self.spi.write(&self.tx)?;
        self.spi.flush()?;
        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }

    pub fn pixels(&self) -> &[PackedColor; NUM_LEDS] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        NUM_LEDS
    }

    pub fn is_empty(&self) -> bool {
        NUM_LEDS == 0
    }

    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Give the SPI bus back (used by tests to inspect what was written).
    pub fn release(self) -> SPI {
        self.spi
    }
}
