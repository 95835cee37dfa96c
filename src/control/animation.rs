//! Palette animation engine.
//!
//! Each render tick scrolls the palette along the strip by
//! `offset_increment` positions.  A solid colour selection pauses the
//! scroll without forgetting the palette or the offset, so the next
//! button press resumes exactly where the animation left off.

use log::{debug, info};

use crate::app::ports::PixelStripPort;
use crate::color::{self, PackedColor, Rgb8};
use crate::config::{ANIMATION_BRIGHTNESS, OFFSET_MAX};
use crate::palette::{Palette, PaletteId};

pub struct AnimationEngine {
    palette: &'static Palette,
    /// Always in `0..OFFSET_MAX`.
    offset: i64,
    offset_increment: i64,
    cycling: bool,
}

impl AnimationEngine {
    pub fn new(initial_increment: i32) -> Self {
        Self {
            palette: PaletteId::Rainbow.palette(),
            offset: 0,
            offset_increment: i64::from(initial_increment),
            cycling: true,
        }
    }

    /// Offset and cycling are left untouched.
    pub fn select_palette(&mut self, id: PaletteId) {
        info!("palette -> {}", id.palette().name);
        self.palette = id.palette();
    }

    /// Unbounded: the increment may reach zero (frozen) or go negative
    /// (reverse scroll).
    pub fn adjust_speed(&mut self, delta: i32) {
        self.offset_increment = self.offset_increment.saturating_add(i64::from(delta));
        debug!("offset increment -> {}", self.offset_increment);
    }

    /// Fill the strip with one colour at full intensity and pause cycling.
    pub fn set_solid(&mut self, rgb: Rgb8, strip: &mut impl PixelStripPort) {
        self.cycling = false;
        strip.fill(PackedColor::from(rgb));
        strip.show();
    }

    pub fn enable_cycling(&mut self) {
        self.cycling = true;
    }

    /// Render one animation frame.  Returns `false` without touching the
    /// strip while cycling is paused.
    pub fn tick(&mut self, strip: &mut impl PixelStripPort) -> bool {
        if !self.cycling {
            return false;
        }

        let step = self.offset_increment.rem_euclid(OFFSET_MAX);
        self.offset = (self.offset + step).rem_euclid(OFFSET_MAX);

        let len = strip.pixel_count();
        for i in 0..len {
            let position = (self.offset + i as i64) as f32 / len as f32;
            let c = color::interpolate(self.palette.stops, position);
            let c = color::gamma_adjust(c, ANIMATION_BRIGHTNESS);
            strip.write_pixel(i, color::pack(c));
        }
        strip.show();
        true
    }

    pub fn palette(&self) -> PaletteId {
        self.palette.id
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn offset_increment(&self) -> i64 {
        self.offset_increment
    }

    pub fn is_cycling(&self) -> bool {
        self.cycling
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(1)
    }
}


#[cfg(all(test, not(target_os = "espidf")))]
mod proptests {
    use super::*;
    use crate::config::NUM_LEDS;
    use proptest::prelude::*;

    struct NullStrip;

    impl PixelStripPort for NullStrip {
        fn write_pixel(&mut self, _index: usize, _color: PackedColor) {}
        fn fill(&mut self, _color: PackedColor) {}
        fn show(&mut self) {}
        fn pixel_count(&self) -> usize {
            NUM_LEDS
        }
    }

    proptest! {
        #[test]
        fn offset_stays_in_range(
            deltas in proptest::collection::vec(-2_000_000i32..2_000_000, 1..20),
            ticks in 1usize..20,
        ) {
            let mut a = AnimationEngine::default();
            let mut expected: i64 = 0;
            for d in deltas {
                a.adjust_speed(d);
                for _ in 0..ticks {
                    a.tick(&mut NullStrip);
                    expected = (expected + a.offset_increment()).rem_euclid(OFFSET_MAX);
                    prop_assert!((0..OFFSET_MAX).contains(&a.offset()));
                    prop_assert_eq!(a.offset(), expected);
                }
            }
        }
    }
}
