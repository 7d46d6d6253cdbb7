// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Brightness curve for the pulse effect.
//!
//! A keyframe curve sampled with scaled simulation time. Output is always
//! within 0.0 - 1.0.

use serde::{Deserialize, Serialize};

/// One curve keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: f64,
}

impl Keyframe {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Interpolation between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Straight line
    Linear,
    /// Smoothstep (zero slope at each key)
    #[default]
    Smooth,
}

/// Behavior outside the keyed time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Hold the first/last value
    Clamp,
    /// Repeat the curve
    #[default]
    Loop,
    /// Repeat forwards then backwards
    PingPong,
}

/// Curve validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("curve has no keyframes")]
    Empty,
    #[error("keyframe {0} has a non-finite time or value")]
    NonFinite(usize),
    #[error("keyframe {0} is earlier than the keyframe before it")]
    Unsorted(usize),
}

/// Keyframe brightness curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrightnessCurve {
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub wrap: WrapMode,
    /// Keys in ascending time order
    #[serde(default = "default_keys")]
    pub keys: Vec<Keyframe>,
}

fn default_keys() -> Vec<Keyframe> {
    vec![
        Keyframe::new(0.0, 0.0),
        Keyframe::new(0.5, 1.0),
        Keyframe::new(1.0, 0.0),
    ]
}

impl Default for BrightnessCurve {
    /// Dark to bright to dark once per unit, looping
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            wrap: WrapMode::default(),
            keys: default_keys(),
        }
    }
}

impl BrightnessCurve {
    /// Create a curve from keyframes
    pub fn new(keys: Vec<Keyframe>, interpolation: Interpolation, wrap: WrapMode) -> Self {
        Self {
            interpolation,
            wrap,
            keys,
        }
    }

    /// Check the keys are non-empty, finite and sorted
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (i, key) in self.keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite(i));
            }
            if i > 0 && key.time < self.keys[i - 1].time {
                return Err(CurveError::Unsorted(i));
            }
        }
        Ok(())
    }

    /// Sample the curve; the result is clamped to 0.0 - 1.0
    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if !x.is_finite() {
            return first.value.clamp(0.0, 1.0);
        }

        let span = last.time - first.time;
        let x = if span <= 0.0 {
            first.time
        } else {
            match self.wrap {
                WrapMode::Clamp => x.clamp(first.time, last.time),
                WrapMode::Loop => first.time + (x - first.time).rem_euclid(span),
                WrapMode::PingPong => {
                    let m = (x - first.time).rem_euclid(2.0 * span);
                    first.time + if m > span { 2.0 * span - m } else { m }
                }
            }
        };

        let value = self.sample(x);
        value.clamp(0.0, 1.0)
    }

    fn sample(&self, x: f64) -> f64 {
        // Index of the first key strictly after x
        let upper = self.keys.partition_point(|k| k.time <= x);
        if upper == 0 {
            return self.keys[0].value;
        }
        if upper >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value;
        }

        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let width = b.time - a.time;
        if width <= 0.0 {
            return b.value;
        }
        let u = (x - a.time) / width;
        let u = match self.interpolation {
            Interpolation::Linear => u,
            Interpolation::Smooth => u * u * (3.0 - 2.0 * u),
        };
        a.value + (b.value - a.value) * u
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_curve_keys() {
        let curve = BrightnessCurve::default();
        assert!(curve.validate().is_ok());
        assert!(approx(curve.evaluate(0.0), 0.0));
        assert!(approx(curve.evaluate(0.25), 0.5));
        assert!(approx(curve.evaluate(0.5), 1.0));
        assert!(approx(curve.evaluate(1.0), 0.0));
    }

    #[test]
    fn test_loop_wraps() {
        let curve = BrightnessCurve::default();
        assert!(approx(curve.evaluate(2.5), 1.0));
        assert!(approx(curve.evaluate(-0.5), 1.0));
        assert!(approx(curve.evaluate(7.25), curve.evaluate(0.25)));
    }

    #[test]
    fn test_clamp_and_ping_pong() {
        let keys = vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)];
        let clamp = BrightnessCurve::new(keys.clone(), Interpolation::Linear, WrapMode::Clamp);
        assert!(approx(clamp.evaluate(5.0), 1.0));
        assert!(approx(clamp.evaluate(-5.0), 0.0));
        assert!(approx(clamp.evaluate(0.3), 0.3));

        let ping = BrightnessCurve::new(keys, Interpolation::Linear, WrapMode::PingPong);
        assert!(approx(ping.evaluate(1.25), 0.75));
        assert!(approx(ping.evaluate(2.25), 0.25));
    }

    #[test]
    fn test_output_is_clamped() {
        let keys = vec![Keyframe::new(0.0, -1.0), Keyframe::new(1.0, 3.0)];
        let curve = BrightnessCurve::new(keys, Interpolation::Linear, WrapMode::Clamp);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);
        assert!(approx(curve.evaluate(0.5), 1.0));
    }

    #[test]
    fn test_single_key_is_constant() {
        let curve = BrightnessCurve::new(
            vec![Keyframe::new(2.0, 0.6)],
            Interpolation::Smooth,
            WrapMode::Loop,
        );
        assert!(approx(curve.evaluate(0.0), 0.6));
        assert!(approx(curve.evaluate(123.4), 0.6));
    }

    #[test]
    fn test_validate() {
        let empty = BrightnessCurve::new(Vec::new(), Interpolation::Linear, WrapMode::Loop);
        assert_eq!(empty.validate(), Err(CurveError::Empty));

        let unsorted = BrightnessCurve::new(
            vec![Keyframe::new(1.0, 0.0), Keyframe::new(0.5, 1.0)],
            Interpolation::Linear,
            WrapMode::Loop,
        );
        assert_eq!(unsorted.validate(), Err(CurveError::Unsorted(1)));

        let nan = BrightnessCurve::new(
            vec![Keyframe::new(0.0, f64::NAN)],
            Interpolation::Linear,
            WrapMode::Loop,
        );
        assert_eq!(nan.validate(), Err(CurveError::NonFinite(0)));
    }
}
