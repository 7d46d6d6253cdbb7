// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Light controller: the entry points external UI and drivers call.
//!
//! Combines the engine, the show player and a step source, and applies
//! queued commands at the top of every tick.

use tracing::{info, warn};

use crate::color::Color;
use crate::config::{EngineSettings, SettingsError};
use crate::control::{CommandQueue, CommandSender, EngineCommand};
use crate::engine::{LedSink, LightEngine};
use crate::error::EngineError;
use crate::groups::{EffectKind, GroupId};
use crate::persistence::{LoadReport, SaveDocument};
use crate::registry::{LedHandle, LedRef, LedRegistry};
use crate::show::{ShowEvent, ShowPlayer, ShowSource};

/// Engine plus show playback
pub struct LightController<S: LedSink, Src: ShowSource> {
    engine: LightEngine<S>,
    player: ShowPlayer,
    source: Src,
    commands: CommandQueue,
}

impl<S: LedSink, Src: ShowSource> LightController<S, Src> {
    /// Wrap an engine; the show name comes from its settings
    pub fn new(engine: LightEngine<S>, source: Src) -> Self {
        let player = ShowPlayer::new(engine.settings().show_name.clone());
        Self {
            engine,
            player,
            source,
            commands: CommandQueue::new(),
        }
    }

    /// Build the engine and controller in one step
    pub fn from_settings(
        registry: LedRegistry,
        settings: EngineSettings,
        sink: S,
        source: Src,
    ) -> Result<Self, SettingsError> {
        Ok(Self::new(LightEngine::new(registry, settings, sink)?, source))
    }

    /// Engine
    pub fn engine(&self) -> &LightEngine<S> {
        &self.engine
    }

    /// Mutable engine
    pub fn engine_mut(&mut self) -> &mut LightEngine<S> {
        &mut self.engine
    }

    /// Show player state
    pub fn player(&self) -> &ShowPlayer {
        &self.player
    }

    /// Step source
    pub fn source(&self) -> &Src {
        &self.source
    }

    /// Mutable step source
    pub fn source_mut(&mut self) -> &mut Src {
        &mut self.source
    }

    /// Handle for queueing commands from other threads
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn select_group(&mut self, id: GroupId) -> Result<(), EngineError> {
        self.engine.select_group(id)
    }

    pub fn add_to_group(&mut self, refs: &[LedRef]) -> Result<usize, EngineError> {
        self.engine.add_refs(refs)
    }

    pub fn add_leds(&mut self, leds: &[LedHandle]) -> Result<(), EngineError> {
        self.engine.add_to_group(leds)
    }

    pub fn set_group_color(&mut self, color: Color) -> Result<(), EngineError> {
        self.engine.set_group_color(color)
    }

    pub fn set_group_color_hex(&mut self, hex: &str) -> Result<Color, EngineError> {
        self.engine.set_group_color_hex(hex)
    }

    pub fn set_effect_flag(&mut self, kind: EffectKind, enabled: bool) -> Result<(), EngineError> {
        self.engine.set_effect_flag(kind, enabled)
    }

    pub fn save_current_state(&self) -> SaveDocument {
        self.engine.save_current_state()
    }

    pub fn load_state(&mut self, document: &SaveDocument) -> LoadReport {
        self.engine.load_state(document)
    }

    /// Restart the clock and play from step 0
    pub fn begin_show(&mut self, real: f64) {
        self.engine.reset_clock(real);
        self.player.begin();
        info!("Performance begun: {}", self.player.show_name());
    }

    /// Stop loading steps; displayed colors are kept
    pub fn end_show(&mut self) {
        self.player.end();
        info!("Performance ended at step {}", self.player.last_loaded_step());
    }

    /// Advance one frame at real time `real`; returns the scaled time
    pub fn tick(&mut self, real: f64) -> f64 {
        self.process_commands(real);

        let t = self.engine.scaled_time(real);
        if let Some(document) = self.player.poll(t, &self.source) {
            self.engine.load_state(&document);
        }
        self.engine.animate(real)
    }

    /// Apply every queued command; returns how many ran
    pub fn process_commands(&mut self, real: f64) -> usize {
        let commands = self.commands.drain();
        let count = commands.len();
        for command in commands {
            let name = command.name();
            if let Err(e) = self.apply_command(command, real) {
                warn!("Command {} failed: {}", name, e);
            }
        }
        count
    }

    fn apply_command(&mut self, command: EngineCommand, real: f64) -> Result<(), EngineError> {
        match command {
            EngineCommand::SelectGroup(id) => self.select_group(id)?,
            EngineCommand::AddToGroup(refs) => {
                self.add_to_group(&refs)?;
            }
            EngineCommand::SetGroupColor(color) => self.set_group_color(color)?,
            EngineCommand::SetGroupColorHex(hex) => {
                self.set_group_color_hex(&hex)?;
            }
            EngineCommand::SetEffect(kind, enabled) => self.set_effect_flag(kind, enabled)?,
            EngineCommand::BeginShow => self.begin_show(real),
            EngineCommand::EndShow => self.end_show(),
            EngineCommand::Load(document) => {
                self.load_state(&document);
            }
            EngineCommand::Save(reply) => {
                // The requester may have given up
                let _ = reply.send(self.save_current_state());
            }
        }
        Ok(())
    }

    /// Re-apply an edited step if it is the one on display; returns true if
    /// it was applied
    pub fn handle_show_event(&mut self, event: &ShowEvent) -> bool {
        match event {
            ShowEvent::Reloaded { path, document } if self.player.is_current_step(path) => {
                info!("Reapplying edited show step {:?}", path);
                self.engine.load_state(document);
                true
            }
            ShowEvent::Error(message) => {
                warn!("{}", message);
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ColorBuffer;
    use crate::persistence::GroupRecord;
    use crate::registry::Point3;
    use crate::show::MemorySource;
    use std::path::PathBuf;

    fn controller(source: MemorySource) -> LightController<ColorBuffer, MemorySource> {
        let registry = LedRegistry::from_points((0..4).map(|i| Point3::new(i as f32, 0.0, 0.0)));
        let engine =
            LightEngine::with_seed(registry, EngineSettings::viewer(), ColorBuffer::new(4), 5).unwrap();
        LightController::new(engine, source)
    }

    fn step(color: Color, leds: Vec<i64>) -> SaveDocument {
        SaveDocument {
            groups: vec![GroupRecord {
                id: 1,
                color,
                led_indices: Some(leds),
                ..GroupRecord::default()
            }],
        }
    }

    #[test]
    fn test_show_playback() {
        let red = Color::new(1.0, 0.0, 0.0);
        let blue = Color::new(0.0, 0.0, 1.0);
        let mut source = MemorySource::new();
        source.insert_document("first_demo_refactor", 0, &step(red, vec![0, 1])).unwrap();
        source.insert_document("first_demo_refactor", 1, &step(blue, vec![2])).unwrap();

        let mut controller = controller(source);
        let speed = controller.engine().settings().speed_factor;

        // Not playing: nothing loads
        controller.tick(0.1);
        assert_eq!(controller.engine().sink().get(LedHandle::new(0)), Some(Color::BLACK));

        controller.begin_show(10.0);
        controller.tick(10.0);
        assert_eq!(controller.player().last_loaded_step(), 0);
        assert_eq!(controller.engine().sink().get(LedHandle::new(0)), Some(red));

        controller.tick(10.0 + 1.2 / speed);
        assert_eq!(controller.player().last_loaded_step(), 1);
        assert_eq!(controller.engine().sink().get(LedHandle::new(2)), Some(blue));
        // Dynamic mode replaced the store; old paint stays on screen
        assert_eq!(controller.engine().store().owner_of(LedHandle::new(0)), None);
        assert_eq!(controller.engine().sink().get(LedHandle::new(0)), Some(red));

        controller.end_show();
        controller.tick(10.0 + 5.0 / speed);
        assert_eq!(controller.player().last_loaded_step(), 1);
    }

    #[test]
    fn test_queued_commands_apply_in_order() {
        let mut controller = controller(MemorySource::new());
        let sender = controller.command_sender();

        sender.select_group(3).unwrap();
        sender.add_to_group(vec![LedRef::Index(1), LedRef::Index(2)]).unwrap();
        sender.select_group(4).unwrap();
        sender.add_to_group(vec![LedRef::Index(2)]).unwrap();
        sender.send(EngineCommand::SetGroupColorHex("nope".into())).unwrap();
        let reply = sender.request_save().unwrap();

        assert_eq!(controller.process_commands(0.0), 6);
        let saved = reply.recv().unwrap();
        assert_eq!(saved.group(3).unwrap().led_indices, Some(vec![1]));
        assert_eq!(saved.group(4).unwrap().led_indices, Some(vec![2]));
    }

    #[test]
    fn test_reload_current_step() {
        let green = Color::new(0.0, 1.0, 0.0);
        let mut source = MemorySource::new();
        source
            .insert_document("first_demo_refactor", 0, &step(Color::WHITE, vec![0]))
            .unwrap();
        let mut controller = controller(source);
        controller.begin_show(0.0);
        controller.tick(0.0);

        let event = ShowEvent::Reloaded {
            path: PathBuf::from("shows/first_demo_refactor/0.json"),
            document: Box::new(step(green, vec![3])),
        };
        assert!(controller.handle_show_event(&event));
        assert_eq!(controller.engine().sink().get(LedHandle::new(3)), Some(green));

        let other = ShowEvent::Reloaded {
            path: PathBuf::from("shows/first_demo_refactor/7.json"),
            document: Box::new(step(green, vec![1])),
        };
        assert!(!controller.handle_show_event(&other));
    }
}
