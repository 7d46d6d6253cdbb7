// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-LED color functions for the three group effects.

use rand::Rng;

use crate::color::{Color, Palette};

/// Dimmest pulse level relative to the group color
pub const PULSE_LOW: f32 = 0.8;
/// Brightest pulse level relative to the group color
pub const PULSE_HIGH: f32 = 1.2;

/// Pulse color for curve value `v` in 0.0 - 1.0
pub fn pulse_color(base: Color, v: f64) -> Color {
    Color::lerp(base.scale(PULSE_LOW), base.scale(PULSE_HIGH), v as f32)
}

/// Uniformly random color for one static step
pub fn static_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::random(rng)
}

/// One twinkle flash
pub fn twinkle_color<R: Rng + ?Sized>(palette: &Palette, rng: &mut R) -> Color {
    palette.pick(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-6 && (a.g - b.g).abs() < 1e-6 && (a.b - b.b).abs() < 1e-6
    }

    #[test]
    fn test_pulse_bounds() {
        let base = Color::new(0.5, 0.25, 1.0);
        assert!(close(pulse_color(base, 0.0), Color::new(0.4, 0.2, 0.8)));
        assert!(close(pulse_color(base, 0.5), base));
        assert!(close(pulse_color(base, 1.0), Color::new(0.6, 0.3, 1.2)));
    }

    #[test]
    fn test_pulse_keeps_alpha() {
        let base = Color::new(1.0, 0.0, 0.0).with_alpha(0.5);
        assert_eq!(pulse_color(base, 1.0).a, 0.5);
    }

    #[test]
    fn test_twinkle_from_palette() {
        let palette = Palette::twinkle();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(palette.contains(&twinkle_color(&palette, &mut rng)));
        }
    }

    #[test]
    fn test_static_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let c = static_color(&mut rng);
        assert!((0.0..1.0).contains(&c.r));
        assert!((0.0..1.0).contains(&c.g));
        assert!((0.0..1.0).contains(&c.b));
    }
}
