//! Colour math for the NeoPixel path.
//!
//! Colours are carried as normalised `f32` RGB until the very last step,
//! where [`pack`] turns them into the `0x00RRGGBB` word the strip stores.
//!
//! ```text
//!  Palette ──interpolate──▶ Color ──gamma_adjust──▶ Color ──pack──▶ PackedColor
//! ```

use crate::config::GAMMA;

/// Normalised RGB colour, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels (`255` maps to `1.0`).
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Linear blend towards `other`; `weight` 0.0 keeps `self`.
    pub fn mix(self, other: Self, weight: f32) -> Self {
        let inv = 1.0 - weight;
        Self {
            r: self.r * inv + other.r * weight,
            g: self.g * inv + other.g * weight,
            b: self.b * inv + other.b * weight,
        }
    }
}

/// 8-bit RGB triple as carried by a colour packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb8> for Color {
    fn from(c: Rgb8) -> Self {
        Self::from_rgb8(c.r, c.g, c.b)
    }
}

impl From<Rgb8> for PackedColor {
    fn from(c: Rgb8) -> Self {
        PackedColor::from_rgb8(c.r, c.g, c.b)
    }
}

/// Transmission-ready colour word, `0x00RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const OFF: Self = Self(0);

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }
}

/// Look up `position` in a palette of colour stops.
///
/// `position` wraps modulo 1.0 and spans the whole palette, so the last
/// stop blends back into the first.  An empty palette yields black.
pub fn interpolate(stops: &[Color], position: f32) -> Color {
    match stops.len() {
        0 => Color::BLACK,
        1 => stops[0],
        len => {
            let scaled = position.rem_euclid(1.0) * len as f32;
            // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
            let idx = (scaled as usize).min(len - 1);
            let weight = scaled - idx as f32;
            stops[idx].mix(stops[(idx + 1) % len], weight)
        }
    }
}

/// Gamma-correct each channel and scale by `brightness`.
pub fn gamma_adjust(color: Color, brightness: f32) -> Color {
    let adjust = |c: f32| c.clamp(0.0, 1.0).powf(GAMMA) * brightness;
    Color {
        r: adjust(color.r),
        g: adjust(color.g),
        b: adjust(color.b),
    }
}

/// Denormalise to 8 bits per channel and pack as `0x00RRGGBB`.
pub fn pack(color: Color) -> PackedColor {
    let denorm = |c: f32| (c.max(0.0) * 256.0).min(255.0) as u8;
    PackedColor::from_rgb8(denorm(color.r), denorm(color.g), denorm(color.b))
}
