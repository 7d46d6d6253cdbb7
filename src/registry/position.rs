// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! LED geometry and the canonical position key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of decimal places kept in a canonical position
pub const POSITION_DECIMALS: u32 = 3;

const SCALE: f64 = 10u64.pow(POSITION_DECIMALS) as f64;

/// A point in installation space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    /// Create a point
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Canonical lookup key for this point
    pub fn canonical(&self) -> CanonicalPosition {
        CanonicalPosition::from_point(*self)
    }
}

impl From<[f32; 3]> for Point3 {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Position quantized to thousandths of a unit.
///
/// The same rounding is applied on insert and on query, so two points that
/// differ only by float jitter below the quantum map to the same key.
/// Halfway cases round to even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPosition {
    x: i64,
    y: i64,
    z: i64,
}

impl CanonicalPosition {
    /// Quantize a point
    pub fn from_point(p: Point3) -> Self {
        Self {
            x: quantize(p.x),
            y: quantize(p.y),
            z: quantize(p.z),
        }
    }

    /// Back to a (rounded) point
    pub fn to_point(&self) -> Point3 {
        Point3::new(
            (self.x as f64 / SCALE) as f32,
            (self.y as f64 / SCALE) as f32,
            (self.z as f64 / SCALE) as f32,
        )
    }

    /// Quantized components in thousandths
    pub fn raw(&self) -> (i64, i64, i64) {
        (self.x, self.y, self.z)
    }
}

fn quantize(v: f32) -> i64 {
    (v as f64 * SCALE).round_ties_even() as i64
}

impl fmt::Display for CanonicalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.to_point();
        write!(f, "({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_collapses_to_one_key() {
        let a = Point3::new(1.0001, 2.0, -3.5);
        let b = Point3::new(1.00004, 2.0000001, -3.49996);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_distinct_at_precision() {
        let a = Point3::new(0.001, 0.0, 0.0);
        let b = Point3::new(0.002, 0.0, 0.0);
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_round_trip_through_point() {
        let key = Point3::new(12.3456, -0.0004, 7.0).canonical();
        assert_eq!(key.raw(), (12346, 0, 7000));
        assert_eq!(key.to_point().canonical(), key);
    }

    #[test]
    fn test_scale_follows_decimals() {
        let quantum = 10f64.powi(-(POSITION_DECIMALS as i32));
        assert_eq!(quantize(1.0), 10i64.pow(POSITION_DECIMALS));
        assert_ne!(
            Point3::new(0.0, 0.0, 0.0).canonical(),
            Point3::new(quantum as f32, 0.0, 0.0).canonical()
        );
    }

    #[test]
    fn test_negative_coordinates() {
        assert_eq!(quantize(-1.2344), -1234);
        assert_eq!(quantize(-1.2346), -1235);
    }

    #[test]
    fn test_display() {
        let key = Point3::new(1.5, 0.0, -2.25).canonical();
        assert_eq!(key.to_string(), "(1.500, 0.000, -2.250)");
    }
}
