//! The four compiled-in animation palettes.
//!
//! Palettes are `'static` and shared: the animation engine only ever holds a
//! reference to one of them.  Stop counts differ per palette.

use crate::color::Color;

/// Identity of a compiled-in palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PaletteId {
    Rainbow = 0,
    Gradient = 1,
    Fire = 2,
    Water = 3,
}

impl PaletteId {
    pub const ALL: [Self; 4] = [Self::Rainbow, Self::Gradient, Self::Fire, Self::Water];

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Rainbow => &RAINBOW,
            Self::Gradient => &GRADIENT,
            Self::Fire => &FIRE,
            Self::Water => &WATER,
        }
    }
}

/// An ordered, immutable sequence of colour stops.
#[derive(Debug, PartialEq)]
pub struct Palette {
    pub id: PaletteId,
    pub name: &'static str,
    pub stops: &'static [Color],
}

pub static RAINBOW: Palette = Palette {
    id: PaletteId::Rainbow,
    name: "rainbow",
    stops: &[
        Color::rgb(1.0, 0.0, 0.0), // red
        Color::rgb(0.5, 0.5, 0.0), // yellow
        Color::rgb(0.0, 1.0, 0.0), // green
        Color::rgb(0.0, 0.5, 0.5), // cyan
        Color::rgb(0.0, 0.0, 1.0), // blue
        Color::rgb(0.5, 0.0, 0.5), // magenta
    ],
};

pub static GRADIENT: Palette = Palette {
    id: PaletteId::Gradient,
    name: "gradient",
    stops: &[
        Color::from_rgb8(160, 0, 141), // purples
        Color::from_rgb8(77, 0, 160),
        Color::from_rgb8(124, 0, 255),
        Color::from_rgb8(0, 68, 214),
    ],
};

pub static FIRE: Palette = Palette {
    id: PaletteId::Fire,
    name: "fire",
    stops: &[
        Color::BLACK,
        Color::rgb(1.0, 0.0, 0.0), // red (hue 1.0)
        Color::rgb(1.0, 1.0, 0.0), // yellow
        Color::WHITE,
    ],
};

pub static WATER: Palette = Palette {
    id: PaletteId::Water,
    name: "water",
    stops: &[
        Color::from_rgb8(0, 214, 214), // blues and cyans
        Color::from_rgb8(0, 92, 160),
        Color::from_rgb8(0, 123, 255),
        Color::from_rgb8(0, 68, 214),
    ],
};
