// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Fixed color palettes for randomized effects.

use rand::Rng;

use super::{Color, ColorError};

/// Twinkle palette: navy, burnt orange, white
pub const TWINKLE_DEFAULTS: [&str; 3] = ["#001733", "#BF4F00", "#FFFFFF"];

/// A non-empty list of colors to pick from
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette; falls back to white if `colors` is empty
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            Self {
                colors: vec![Color::WHITE],
            }
        } else {
            Self { colors }
        }
    }

    /// Build a palette from hex strings
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Result<Self, ColorError> {
        let colors = entries
            .iter()
            .map(|e| Color::from_hex(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(colors))
    }

    /// The default twinkle palette
    pub fn twinkle() -> Self {
        Self::new(vec![
            Color::from_rgb8(0x00, 0x17, 0x33),
            Color::from_rgb8(0xBF, 0x4F, 0x00),
            Color::WHITE,
        ])
    }

    /// Pick one entry uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        self.colors[rng.gen_range(0..self.colors.len())]
    }

    /// All entries
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Check whether a color is one of the entries
    pub fn contains(&self, color: &Color) -> bool {
        self.colors.contains(color)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; an empty palette is replaced by white on construction
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::twinkle()
    }
}
