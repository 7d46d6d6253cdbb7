// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Color model for LED output.
//!
//! Colors are linear RGBA floats in the nominal 0.0 - 1.0 range. Values above
//! 1.0 are allowed (a pulsing group peaks at 1.2x its base color); sinks that
//! need bytes clamp through [`Color::to_rgb8`].

pub mod palette;

pub use palette::{Palette, TWINKLE_DEFAULTS};

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Error produced when a color string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// Not 3, 6 or 8 hex digits after the optional `#`
    #[error("'{0}' is not a valid hexadecimal color")]
    InvalidHex(String),
}

fn default_alpha() -> f32 {
    1.0
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel (carried through save files, ignored by effects)
    #[serde(default = "default_alpha")]
    pub a: f32,
}

impl Color {
    /// Off
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    /// Full white
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create an opaque color
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Set the alpha channel
    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Uniformly random opaque color
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// Multiply the color channels by a factor, leaving alpha untouched
    pub fn scale(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Linear interpolation between two colors; `t` is clamped to 0.0 - 1.0
    pub fn lerp(from: Color, to: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: from.r + (to.r - from.r) * t,
            g: from.g + (to.g - from.g) * t,
            b: from.b + (to.b - from.b) * t,
            a: from.a + (to.a - from.a) * t,
        }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional)
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let invalid = || ColorError::InvalidHex(input.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            3 => {
                // Each digit is doubled: "F80" -> "FF8800"
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let nibble = c.to_digit(16).ok_or_else(invalid)? as u8;
                    out[i] = nibble * 17;
                }
                Ok(Self::from_rgb8(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(&digits[0..2])?;
                let g = channel(&digits[2..4])?;
                let b = channel(&digits[4..6])?;
                let color = Self::from_rgb8(r, g, b);
                if digits.len() == 8 {
                    let a = channel(&digits[6..8])?;
                    Ok(color.with_alpha(a as f32 / 255.0))
                } else {
                    Ok(color)
                }
            }
            _ => Err(invalid()),
        }
    }

    /// Clamp to 8-bit channels
    pub fn to_rgb8(&self) -> [u8; 3] {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b)]
    }

    /// Uppercase `RRGGBB` without the leading `#`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}
