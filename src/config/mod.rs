// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system.
//!
//! This module provides data structures for loading:
//! - The installation layout (sections, rows, LED positions) from YAML
//! - Engine settings (clock, effects, addressing) from TOML

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::{Palette, TWINKLE_DEFAULTS};
use crate::engine::{BrightnessCurve, StepRule};
use crate::groups::GroupMode;
use crate::persistence::Addressing;
use crate::registry::SectionOrder;

/// Root of an installation layout file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InstallationFile {
    /// Installation name
    #[serde(default)]
    pub name: Option<String>,
    /// Sections in file order (the registry sorts them)
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl InstallationFile {
    /// Load a layout from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read layout file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a layout from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML layout")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize layout to YAML")
    }

    /// Save the layout to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write layout file: {:?}", path.as_ref()))
    }

    /// A layout with one section holding one row
    pub fn single_section(name: impl Into<String>, leds: Vec<[f32; 3]>) -> Self {
        Self {
            name: None,
            sections: vec![SectionConfig {
                name: name.into(),
                rows: vec![leds],
            }],
        }
    }

    /// Parse a plain position list, one LED per line.
    ///
    /// Lines are `x, z` (floor plan, y = 0) or `x, y, z`. Blank lines are
    /// skipped. All LEDs land in one section and one row, in file order.
    pub fn from_positions_txt(text: &str, section_name: &str) -> Result<Self> {
        let mut leds = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let values = line
                .split(',')
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Invalid number on line {}: {:?}", line_no + 1, line))?;
            let point = match values.as_slice() {
                [x, z] => [*x, 0.0, *z],
                [x, y, z] => [*x, *y, *z],
                _ => {
                    return Err(anyhow!(
                        "Expected 2 or 3 values on line {}, found {}",
                        line_no + 1,
                        values.len()
                    ))
                }
            };
            leds.push(point);
        }
        Ok(Self::single_section(section_name, leds))
    }

    /// Total LEDs across all sections
    pub fn led_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.rows.iter().map(|r| r.len()).sum::<usize>())
            .sum()
    }
}

/// One section of the installation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionConfig {
    /// Section name, e.g. "Section 3"
    pub name: String,
    /// Rows of LED positions `[x, y, z]`
    #[serde(default)]
    pub rows: Vec<Vec<[f32; 3]>>,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Simulation time units per wall-clock second
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
    /// Multiplier applied to simulation time before sampling the pulse curve
    #[serde(default = "default_pulse_speed")]
    pub pulse_speed: f64,
    /// First static step boundary after a show begins
    #[serde(default = "default_lead_in")]
    pub lead_in: f64,
    /// Twinkle palette as hex strings
    #[serde(default = "default_twinkle_palette")]
    pub twinkle_palette: Vec<String>,
    /// How members are written to save documents
    #[serde(default)]
    pub addressing: Addressing,
    /// Fixed group ids or groups created from loaded documents
    #[serde(default)]
    pub group_mode: GroupMode,
    /// Number of groups created up front in fixed mode
    #[serde(default = "default_group_count")]
    pub group_count: u32,
    /// Section ordering for the flattened index
    #[serde(default)]
    pub section_order: SectionOrder,
    /// Show namespace for step resources
    #[serde(default = "default_show_name")]
    pub show_name: String,
    // Table-valued fields stay last so the TOML output stays valid
    /// How the static step boundary advances
    #[serde(default)]
    pub step_rule: StepRule,
    /// Brightness curve for the pulse effect
    #[serde(default)]
    pub curve: BrightnessCurve,
}

fn default_speed_factor() -> f64 {
    2.3
}
fn default_pulse_speed() -> f64 {
    1.0
}
fn default_lead_in() -> f64 {
    0.45
}
fn default_twinkle_palette() -> Vec<String> {
    TWINKLE_DEFAULTS.iter().map(|s| s.to_string()).collect()
}
fn default_group_count() -> u32 {
    9
}
fn default_show_name() -> String {
    "first_demo".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            speed_factor: default_speed_factor(),
            pulse_speed: default_pulse_speed(),
            lead_in: default_lead_in(),
            step_rule: StepRule::default(),
            curve: BrightnessCurve::default(),
            twinkle_palette: default_twinkle_palette(),
            addressing: Addressing::default(),
            group_mode: GroupMode::default(),
            group_count: default_group_count(),
            section_order: SectionOrder::default(),
            show_name: default_show_name(),
        }
    }
}

impl EngineSettings {
    /// Interactive editing: position addressing, groups 1..=9
    pub fn editor() -> Self {
        Self::default()
    }

    /// Show replay: index addressing, groups created from documents
    pub fn viewer() -> Self {
        Self {
            addressing: Addressing::Index,
            group_mode: GroupMode::Dynamic,
            show_name: "first_demo_refactor".to_string(),
            ..Self::default()
        }
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).context("Failed to parse TOML settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings to TOML")
    }

    /// The twinkle palette
    pub fn palette(&self) -> Result<Palette, SettingsError> {
        Palette::from_hex(&self.twinkle_palette)
            .map_err(|e| SettingsError::InvalidPalette(e.to_string()))
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.speed_factor > 0.0 && self.speed_factor.is_finite()) {
            return Err(SettingsError::InvalidSpeedFactor(self.speed_factor));
        }
        if !self.pulse_speed.is_finite() {
            return Err(SettingsError::InvalidPulseSpeed(self.pulse_speed));
        }
        if let StepRule::Fixed { length } = self.step_rule {
            if !(length > 0.0 && length.is_finite()) {
                return Err(SettingsError::InvalidStepLength(length));
            }
        }
        if self.group_mode == GroupMode::Fixed && self.group_count == 0 {
            return Err(SettingsError::NoGroups);
        }
        if self.twinkle_palette.is_empty() {
            return Err(SettingsError::InvalidPalette("palette is empty".to_string()));
        }
        self.palette()?;
        self.curve
            .validate()
            .map_err(|e| SettingsError::InvalidCurve(e.to_string()))?;
        Ok(())
    }
}

/// Settings validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Speed factor must be positive, got {0}")]
    InvalidSpeedFactor(f64),
    #[error("Pulse speed must be finite, got {0}")]
    InvalidPulseSpeed(f64),
    #[error("Step length must be positive, got {0}")]
    InvalidStepLength(f64),
    #[error("Fixed group mode needs at least one group")]
    NoGroups,
    #[error("Invalid twinkle palette: {0}")]
    InvalidPalette(String),
    #[error("Invalid brightness curve: {0}")]
    InvalidCurve(String),
}
