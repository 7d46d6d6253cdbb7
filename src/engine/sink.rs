// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! LED color sink.
//!
//! The only outward call the engine makes. Renderers, hardware drivers and
//! tests implement [`LedSink`] to receive display colors.

use crate::color::Color;
use crate::registry::LedHandle;

/// Receives the display color of individual LEDs
pub trait LedSink {
    /// Set an LED's displayed color
    fn set_color(&mut self, led: LedHandle, color: Color);
}

impl<S: LedSink + ?Sized> LedSink for &mut S {
    fn set_color(&mut self, led: LedHandle, color: Color) {
        (**self).set_color(led, color);
    }
}

impl<S: LedSink + ?Sized> LedSink for Box<S> {
    fn set_color(&mut self, led: LedHandle, color: Color) {
        (**self).set_color(led, color);
    }
}

/// In-memory frame of LED colors indexed by flattened LED index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorBuffer {
    colors: Vec<Color>,
    /// Number of `set_color` calls since the last `reset_writes`
    writes: usize,
}

impl ColorBuffer {
    /// Create a buffer of `len` black LEDs
    pub fn new(len: usize) -> Self {
        Self {
            colors: vec![Color::BLACK; len],
            writes: 0,
        }
    }

    /// Color of one LED
    pub fn get(&self, led: LedHandle) -> Option<Color> {
        self.colors.get(led.index()).copied()
    }

    /// All colors in flattened order
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of LEDs
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Writes since the last reset
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Zero the write counter
    pub fn reset_writes(&mut self) {
        self.writes = 0;
    }
}

impl LedSink for ColorBuffer {
    fn set_color(&mut self, led: LedHandle, color: Color) {
        let index = led.index();
        if index >= self.colors.len() {
            self.colors.resize(index + 1, Color::BLACK);
        }
        self.colors[index] = color;
        self.writes += 1;
    }
}
