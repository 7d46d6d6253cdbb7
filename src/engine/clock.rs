// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Show clock.
//!
//! Converts wall-clock seconds into scaled simulation time and tracks the
//! engine-wide static step boundary. All tick-scoped timing state lives here.

use serde::{Deserialize, Serialize};

/// Default simulation units per wall-clock second
pub const DEFAULT_SPEED_FACTOR: f64 = 2.3;

/// Default static step length in simulation units
pub const DEFAULT_STEP_LENGTH: f64 = 0.25;

/// How the static step boundary advances once crossed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepRule {
    /// Advance past the current time in whole steps of `length`
    Fixed { length: f64 },
    /// Move the boundary to the unscaled elapsed time.
    ///
    /// Reproduces existing recordings exactly. Since scaled time runs faster
    /// than elapsed time, the boundary is crossed again on every later tick.
    Legacy,
}

impl Default for StepRule {
    fn default() -> Self {
        StepRule::Fixed {
            length: DEFAULT_STEP_LENGTH,
        }
    }
}

impl StepRule {
    /// Compute the boundary that follows `next` once scaled time `t` crossed it
    pub fn advance(&self, next: f64, t: f64, elapsed: f64) -> f64 {
        match *self {
            StepRule::Fixed { length } => {
                let steps = ((t - next) / length).floor() + 1.0;
                next + steps.max(1.0) * length
            }
            StepRule::Legacy => elapsed,
        }
    }
}

/// Simulation clock state
#[derive(Debug, Clone, PartialEq)]
pub struct ShowClock {
    /// Scaled units per real second
    speed_factor: f64,
    /// Real time of the last reset
    offset: f64,
    /// Next static step boundary in scaled time
    next_step_time: f64,
    /// Boundary advance rule
    step_rule: StepRule,
}

impl ShowClock {
    /// Create a clock with its offset at zero
    pub fn new(speed_factor: f64, step_rule: StepRule) -> Self {
        Self {
            speed_factor,
            offset: 0.0,
            next_step_time: 0.0,
            step_rule,
        }
    }

    /// Speed factor
    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Real time of the last reset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Next static step boundary
    pub fn next_step_time(&self) -> f64 {
        self.next_step_time
    }

    /// Boundary advance rule
    pub fn step_rule(&self) -> StepRule {
        self.step_rule
    }

    /// Real seconds since the last reset
    pub fn elapsed(&self, real: f64) -> f64 {
        real - self.offset
    }

    /// Scaled simulation time
    pub fn scaled_time(&self, real: f64) -> f64 {
        self.speed_factor * self.elapsed(real)
    }

    /// Restart the clock at `real` with the first step boundary at `lead_in`
    pub fn reset(&mut self, real: f64, lead_in: f64) {
        self.offset = real;
        self.next_step_time = lead_in;
    }

    /// Check if `t` has crossed the step boundary
    pub fn step_due(&self, t: f64) -> bool {
        t >= self.next_step_time
    }

    /// Advance the boundary if `t` has crossed it; returns true if it moved
    pub fn advance(&mut self, t: f64, real: f64) -> bool {
        if !self.step_due(t) {
            return false;
        }
        self.next_step_time = self
            .step_rule
            .advance(self.next_step_time, t, self.elapsed(real));
        true
    }
}

impl Default for ShowClock {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_FACTOR, StepRule::default())
    }
}
