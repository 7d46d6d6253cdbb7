// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stadium LED show engine.
//!
//! Groups individually addressable LEDs of a stadium installation, animates
//! each group with pulse, static and twinkle effects, and replays numbered
//! sequences of JSON save documents as a light show.
//!
//! - [`registry`]: canonical LED ordering with position and index lookup
//! - [`groups`]: group records and the one-group-per-LED membership store
//! - [`engine`]: clock, effects and the per-tick animation
//! - [`persistence`]: save document codec
//! - [`show`]: step sources, playback and the show directory watcher
//! - [`controller`]: entry points for UI and network drivers

pub mod color;
pub mod config;
pub mod control;
pub mod controller;
pub mod engine;
pub mod error;
pub mod groups;
pub mod persistence;
pub mod registry;
pub mod show;

pub use color::{Color, Palette};
pub use config::{EngineSettings, InstallationFile};
pub use controller::LightController;
pub use engine::{ColorBuffer, LedSink, LightEngine};
pub use error::EngineError;
pub use groups::{EffectKind, GroupId, GroupMode};
pub use persistence::{Addressing, SaveDocument};
pub use registry::{LedHandle, LedRef, LedRegistry};
pub use show::{DirectorySource, MemorySource, ShowPlayer, ShowSource};
