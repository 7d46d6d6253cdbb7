// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Animation engine.
//!
//! The engine owns the registry, the group store and the clock, and writes
//! display colors to an [`LedSink`]. Each call to [`LightEngine::animate`]
//! walks the groups in order:
//! 1. Pulse groups get their curve-modulated color
//! 2. Static groups get random colors, but only if the step boundary was crossed
//!
//! and then advances the step boundary. Static is applied after pulse, so a
//! group with both effects shows static on the ticks where a step fires.

pub mod clock;
pub mod curve;
pub mod effects;
pub mod sink;

pub use clock::{ShowClock, StepRule, DEFAULT_SPEED_FACTOR, DEFAULT_STEP_LENGTH};
pub use curve::{BrightnessCurve, CurveError, Interpolation, Keyframe, WrapMode};
pub use sink::{ColorBuffer, LedSink};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::color::{Color, Palette};
use crate::config::{EngineSettings, SettingsError};
use crate::error::EngineError;
use crate::groups::{EffectKind, GroupId, GroupMode, GroupStore};
use crate::persistence::{self, Addressing, LoadReport, SaveDocument};
use crate::registry::{LedHandle, LedRef, LedRegistry};

/// Grouping and animation engine
pub struct LightEngine<S: LedSink> {
    registry: LedRegistry,
    store: GroupStore,
    settings: EngineSettings,
    clock: ShowClock,
    palette: Palette,
    rng: StdRng,
    sink: S,
}

impl<S: LedSink> LightEngine<S> {
    /// Create an engine; every LED is set to black
    pub fn new(registry: LedRegistry, settings: EngineSettings, sink: S) -> Result<Self, SettingsError> {
        Self::with_rng(registry, settings, sink, StdRng::from_entropy())
    }

    /// Create an engine with a deterministic random source
    pub fn with_seed(
        registry: LedRegistry,
        settings: EngineSettings,
        sink: S,
        seed: u64,
    ) -> Result<Self, SettingsError> {
        Self::with_rng(registry, settings, sink, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        registry: LedRegistry,
        settings: EngineSettings,
        sink: S,
        mut rng: StdRng,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let palette = settings.palette()?;
        let store = match settings.group_mode {
            GroupMode::Fixed => GroupStore::fixed(settings.group_count, &mut rng),
            GroupMode::Dynamic => GroupStore::dynamic(),
        };
        let clock = ShowClock::new(settings.speed_factor, settings.step_rule);

        let mut engine = Self {
            registry,
            store,
            settings,
            clock,
            palette,
            rng,
            sink,
        };
        engine.blackout();
        Ok(engine)
    }

    /// Set every LED to black
    pub fn blackout(&mut self) {
        for led in self.registry.handles() {
            self.sink.set_color(led, Color::BLACK);
        }
    }

    /// LED registry
    pub fn registry(&self) -> &LedRegistry {
        &self.registry
    }

    /// Group store
    pub fn store(&self) -> &GroupStore {
        &self.store
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Clock state
    pub fn clock(&self) -> &ShowClock {
        &self.clock
    }

    /// Twinkle palette
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Color sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable color sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the engine and return its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Select the group targeted by subsequent edits
    pub fn select_group(&mut self, id: GroupId) -> Result<(), EngineError> {
        self.store.select(id, &mut self.rng)
    }

    /// Move LEDs into the selected group and paint them its color.
    ///
    /// With position addressing a duplicate-position LED stands for the
    /// first LED at its position, so saved groups reload unchanged.
    pub fn add_to_group(&mut self, leds: &[LedHandle]) -> Result<(), EngineError> {
        let members = leds
            .iter()
            .map(|&led| {
                self.addressable(led)
                    .ok_or_else(|| EngineError::UnknownLed(led.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let color = self.store.assign(&members)?;
        for &led in &members {
            self.sink.set_color(led, color);
        }
        Ok(())
    }

    fn addressable(&self, led: LedHandle) -> Option<LedHandle> {
        match self.settings.addressing {
            Addressing::Position => self.registry.canonical_handle(led),
            Addressing::Index => self.registry.contains(led).then_some(led),
        }
    }

    /// Resolve references and add them to the selected group.
    ///
    /// Nothing changes unless every reference resolves. Returns the number
    /// of LEDs added.
    pub fn add_refs(&mut self, refs: &[LedRef]) -> Result<usize, EngineError> {
        let mut leds = Vec::new();
        for led_ref in refs {
            leds.extend(self.registry.resolve(led_ref)?);
        }
        self.add_to_group(&leds)?;
        Ok(leds.len())
    }

    /// Set the selected group's color and repaint its members
    pub fn set_group_color(&mut self, color: Color) -> Result<(), EngineError> {
        let members = self.store.set_color(color)?;
        for &led in members {
            self.sink.set_color(led, color);
        }
        Ok(())
    }

    /// Parse a hex color and apply it to the selected group.
    ///
    /// A malformed string leaves the group untouched.
    pub fn set_group_color_hex(&mut self, hex: &str) -> Result<Color, EngineError> {
        let color = Color::from_hex(hex)?;
        self.set_group_color(color)?;
        Ok(color)
    }

    /// Toggle an effect on the selected group
    pub fn set_effect_flag(&mut self, kind: EffectKind, enabled: bool) -> Result<(), EngineError> {
        self.store.set_effect(kind, enabled).map(|_| ())
    }

    /// Snapshot the group store
    pub fn save_current_state(&self) -> SaveDocument {
        persistence::encode(&self.store, &self.registry, self.settings.addressing)
    }

    /// Apply a document and paint its members
    pub fn load_state(&mut self, document: &SaveDocument) -> LoadReport {
        let report = persistence::apply(
            document,
            &mut self.store,
            &self.registry,
            &self.palette,
            &mut self.rng,
        );
        for &(led, color) in &report.paints {
            self.sink.set_color(led, color);
        }
        debug!(
            applied = report.applied,
            skipped_groups = report.skipped_groups.len(),
            skipped_members = report.skipped_members,
            "Save document applied"
        );
        report
    }

    /// Restart the clock at `real` with the configured lead-in
    pub fn reset_clock(&mut self, real: f64) {
        self.clock.reset(real, self.settings.lead_in);
    }

    /// Scaled time at real time `real`
    pub fn scaled_time(&self, real: f64) -> f64 {
        self.clock.scaled_time(real)
    }

    /// Paint one frame at real time `real`; returns the scaled time used
    pub fn animate(&mut self, real: f64) -> f64 {
        let t = self.clock.scaled_time(real);
        let step = self.clock.step_due(t);
        let v = self.settings.curve.evaluate(t * self.settings.pulse_speed);

        for group in self.store.groups() {
            if group.is_pulse_active() {
                let color = effects::pulse_color(group.color(), v);
                for &led in group.members() {
                    self.sink.set_color(led, color);
                }
            }
            if step && group.is_static_active() {
                for &led in group.members() {
                    self.sink.set_color(led, effects::static_color(&mut self.rng));
                }
            }
        }

        self.clock.advance(t, real);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Point3;

    fn registry(n: usize) -> LedRegistry {
        LedRegistry::from_points((0..n).map(|i| Point3::new(i as f32, 0.0, 0.0)))
    }

    fn engine(settings: EngineSettings) -> LightEngine<ColorBuffer> {
        LightEngine::with_seed(registry(6), settings, ColorBuffer::new(0), 11).unwrap()
    }

    fn h(i: usize) -> LedHandle {
        LedHandle::new(i)
    }

    #[test]
    fn test_new_engine_is_black() {
        let engine = engine(EngineSettings::default());
        assert_eq!(engine.sink().len(), 6);
        assert!(engine.sink().colors().iter().all(|c| *c == Color::BLACK));
        assert_eq!(engine.store().len(), 9);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = EngineSettings {
            speed_factor: -1.0,
            ..EngineSettings::default()
        };
        assert!(LightEngine::new(registry(1), settings, ColorBuffer::new(1)).is_err());
    }

    #[test]
    fn test_add_to_group_paints_immediately() {
        let mut engine = engine(EngineSettings::default());
        engine.set_group_color(Color::new(1.0, 0.0, 0.0)).unwrap();
        engine.add_to_group(&[h(1), h(2)]).unwrap();
        assert_eq!(engine.sink().get(h(1)), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(engine.sink().get(h(0)), Some(Color::BLACK));
    }

    #[test]
    fn test_add_unknown_led_changes_nothing() {
        let mut engine = engine(EngineSettings::default());
        let err = engine.add_to_group(&[h(0), h(6)]).unwrap_err();
        assert!(matches!(err, EngineError::UnknownLed(_)));
        assert_eq!(engine.store().member_count(), 0);
    }

    #[test]
    fn test_add_refs_is_all_or_nothing() {
        let mut engine = engine(EngineSettings::default());
        let refs = [
            LedRef::Index(0),
            LedRef::Range {
                section: 0,
                offset: 4,
                length: 3,
            },
        ];
        assert!(engine.add_refs(&refs).unwrap_err().is_out_of_range());
        assert_eq!(engine.store().member_count(), 0);

        let count = engine
            .add_refs(&[LedRef::Position(Point3::new(3.0, 0.0, 0.0)), LedRef::Index(5)])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(engine.store().owner_of(h(3)), Some(1));
    }

    #[test]
    fn test_set_color_recolors_members() {
        let mut engine = engine(EngineSettings::default());
        engine.add_to_group(&[h(4)]).unwrap();
        let green = engine.set_group_color_hex("#00FF00").unwrap();
        assert_eq!(engine.sink().get(h(4)), Some(green));
        assert_eq!(engine.store().group(1).unwrap().color(), green);
    }

    #[test]
    fn test_malformed_hex_keeps_color() {
        let mut engine = engine(EngineSettings::default());
        let before = engine.store().group(1).unwrap().color();
        let err = engine.set_group_color_hex("#12345").unwrap_err();
        assert!(matches!(err, EngineError::MalformedColor(_)));
        assert_eq!(engine.store().group(1).unwrap().color(), before);
    }

    #[test]
    fn test_pulse_follows_curve() {
        let mut engine = engine(EngineSettings::default());
        let base = Color::new(0.5, 0.5, 0.5);
        engine.set_group_color(base).unwrap();
        engine.add_to_group(&[h(0)]).unwrap();
        engine.set_effect_flag(EffectKind::Pulse, true).unwrap();
        engine.reset_clock(0.0);

        let speed = engine.settings().speed_factor;
        for t in [0.0, 0.25, 0.5] {
            engine.animate(t / speed);
            let v = engine.settings().curve.evaluate(t);
            let expected = effects::pulse_color(base, v);
            let actual = engine.sink().get(h(0)).unwrap();
            assert!((actual.r - expected.r).abs() < 1e-5);
        }
    }

    #[test]
    fn test_static_once_per_step() {
        let mut engine = engine(EngineSettings::default());
        engine.add_to_group(&[h(0), h(1)]).unwrap();
        engine.set_effect_flag(EffectKind::Static, true).unwrap();
        engine.reset_clock(0.0);

        let speed = engine.settings().speed_factor;
        let real = |t: f64| t / speed;

        // Before the lead-in nothing changes
        engine.animate(real(0.3));
        let initial = engine.sink().get(h(0));

        engine.animate(real(0.5));
        let first = engine.sink().get(h(0));
        assert_ne!(first, initial);

        engine.animate(real(0.5));
        assert_eq!(engine.sink().get(h(0)), first);

        engine.animate(real(0.8));
        assert_ne!(engine.sink().get(h(0)), first);
    }

    #[test]
    fn test_static_overwrites_pulse() {
        let mut engine = engine(EngineSettings::default());
        engine.add_to_group(&[h(0)]).unwrap();
        engine.set_effect_flag(EffectKind::Pulse, true).unwrap();
        engine.set_effect_flag(EffectKind::Static, true).unwrap();
        engine.reset_clock(0.0);

        let color = engine.store().group(1).unwrap().color();
        let t = 0.5;
        engine.animate(t / engine.settings().speed_factor);
        let pulsed = effects::pulse_color(color, engine.settings().curve.evaluate(t));
        assert_ne!(engine.sink().get(h(0)), Some(pulsed));
    }

    #[test]
    fn test_legacy_step_rule_fires_every_tick() {
        let settings = EngineSettings {
            step_rule: StepRule::Legacy,
            ..EngineSettings::default()
        };
        let mut engine = engine(settings);
        engine.add_to_group(&[h(0)]).unwrap();
        engine.set_effect_flag(EffectKind::Static, true).unwrap();
        engine.reset_clock(0.0);

        engine.animate(1.0);
        let a = engine.sink().get(h(0));
        engine.animate(1.01);
        assert_ne!(engine.sink().get(h(0)), a);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut engine = engine(EngineSettings::default());
        engine.add_to_group(&[h(0), h(1)]).unwrap();
        engine.select_group(5).unwrap();
        engine.add_to_group(&[h(3)]).unwrap();
        engine.set_effect_flag(EffectKind::Twinkle, true).unwrap();
        let saved = engine.save_current_state();

        let mut other = LightEngine::with_seed(registry(6), EngineSettings::default(), ColorBuffer::new(6), 99)
            .unwrap();
        let report = other.load_state(&saved);
        assert_eq!(report.applied, 9);
        assert_eq!(other.save_current_state(), saved);
        assert!(other.palette().contains(&other.sink().get(h(3)).unwrap()));
    }

    fn with_duplicate(settings: EngineSettings, seed: u64) -> LightEngine<ColorBuffer> {
        let registry = LedRegistry::from_points(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0004, 0.0, 0.0),
        ]);
        LightEngine::with_seed(registry, settings, ColorBuffer::new(3), seed).unwrap()
    }

    #[test]
    fn test_duplicate_led_round_trips_by_position() {
        let mut engine = with_duplicate(EngineSettings::default(), 1);
        engine.add_to_group(&[h(2)]).unwrap();
        assert_eq!(engine.store().group(1).unwrap().members(), &[h(0)]);
        assert_eq!(engine.store().owner_of(h(2)), None);

        let saved = engine.save_current_state();
        let mut other = with_duplicate(EngineSettings::default(), 2);
        other.load_state(&saved);
        assert_eq!(
            other.store().group(1).unwrap().members(),
            engine.store().group(1).unwrap().members()
        );
        assert_eq!(other.save_current_state(), saved);
    }

    #[test]
    fn test_duplicate_led_kept_by_index() {
        let settings = EngineSettings {
            addressing: Addressing::Index,
            ..EngineSettings::default()
        };
        let mut engine = with_duplicate(settings.clone(), 1);
        engine.add_to_group(&[h(2)]).unwrap();
        assert_eq!(engine.store().owner_of(h(2)), Some(1));

        let saved = engine.save_current_state();
        let mut other = with_duplicate(settings, 2);
        other.load_state(&saved);
        assert_eq!(other.store().group(1).unwrap().members(), &[h(2)]);
    }

    #[test]
    fn test_sink_access() {
        let mut engine = engine(EngineSettings::default());
        engine.sink_mut().set_color(h(3), Color::WHITE);
        engine.blackout();
        let buffer = engine.into_sink();
        assert_eq!(buffer.get(h(3)), Some(Color::BLACK));
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn test_select_unknown_group() {
        let mut engine = engine(EngineSettings::default());
        assert_eq!(engine.select_group(10), Err(EngineError::UnknownGroup(10)));

        let mut viewer = self::engine(EngineSettings::viewer());
        assert!(viewer.select_group(10).is_ok());
        assert!(viewer.store().contains(10));
    }
}
