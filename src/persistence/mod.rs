// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Save document codec.
//!
//! A save document is a JSON object holding an ordered list of group records:
//!
//! ```json
//! {"groups": [{"id": 1, "isPulseActive": false, "isStaticActive": false,
//!   "isTwinkleActive": true, "color": {"r": 1.0, "g": 0.5, "b": 0.0, "a": 1.0},
//!   "LEDIndices": [0, 1, 2]}]}
//! ```
//!
//! Members are written either as rounded positions (`LEDPositions`) or as
//! flattened indices (`LEDIndices`). Loading replaces each listed group
//! wholesale.

pub mod frame;

pub use frame::document_from_colors;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{Color, Palette};
use crate::engine::effects::twinkle_color;
use crate::groups::{Group, GroupId, GroupMode, GroupState, GroupStore};
use crate::registry::{LedHandle, LedRegistry, Point3};

/// How group members are written to save documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    /// Rounded 3D positions
    #[default]
    Position,
    /// Flattened registry indices
    Index,
}

/// Root of a save document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveDocument {
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// Snapshot of one group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    #[serde(default)]
    pub id: GroupId,
    #[serde(default)]
    pub is_pulse_active: bool,
    #[serde(default)]
    pub is_static_active: bool,
    #[serde(default)]
    pub is_twinkle_active: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(
        rename = "LEDPositions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub led_positions: Option<Vec<Point3>>,
    #[serde(
        rename = "LEDIndices",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub led_indices: Option<Vec<i64>>,
}

impl GroupRecord {
    /// Number of member entries in the record
    pub fn member_count(&self) -> usize {
        self.led_positions.as_ref().map_or(0, Vec::len)
            + self.led_indices.as_ref().map_or(0, Vec::len)
    }
}

impl SaveDocument {
    /// Parse a document from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a record by group id
    pub fn group(&self, id: GroupId) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// Snapshot the group store
pub fn encode(store: &GroupStore, registry: &LedRegistry, addressing: Addressing) -> SaveDocument {
    let groups = store
        .groups()
        .iter()
        .map(|group| encode_group(group, registry, addressing))
        .collect();
    SaveDocument { groups }
}

fn encode_group(group: &Group, registry: &LedRegistry, addressing: Addressing) -> GroupRecord {
    let mut record = GroupRecord {
        id: group.id(),
        is_pulse_active: group.is_pulse_active(),
        is_static_active: group.is_static_active(),
        is_twinkle_active: group.is_twinkle_active(),
        color: group.color(),
        led_positions: None,
        led_indices: None,
    };

    match addressing {
        Addressing::Position => {
            record.led_positions = Some(
                group
                    .members()
                    .iter()
                    .filter_map(|h| registry.canonical_position(*h))
                    .map(|key| key.to_point())
                    .collect(),
            );
        }
        Addressing::Index => {
            record.led_indices = Some(
                group
                    .members()
                    .iter()
                    .map(|h| h.index() as i64)
                    .collect(),
            );
        }
    }
    record
}

/// Result of applying a document to the group store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Display colors to apply, in order
    pub paints: Vec<(LedHandle, Color)>,
    /// Records applied to a group
    pub applied: usize,
    /// Record ids with no matching group
    pub skipped_groups: Vec<GroupId>,
    /// Member entries that matched no LED
    pub skipped_members: usize,
}

/// Apply a document to the group store.
///
/// In dynamic mode the store is cleared first and every record creates its
/// group. In fixed mode records for unknown ids are skipped. Every member is
/// painted with a twinkle palette color if the record has twinkle enabled,
/// otherwise with the record color.
pub fn apply<R: Rng + ?Sized>(
    document: &SaveDocument,
    store: &mut GroupStore,
    registry: &LedRegistry,
    palette: &Palette,
    rng: &mut R,
) -> LoadReport {
    let mut report = LoadReport::default();

    if store.mode() == GroupMode::Dynamic {
        store.clear();
    }

    for record in &document.groups {
        if !store.contains(record.id) {
            match store.mode() {
                GroupMode::Fixed => {
                    debug!("Skipping record for unknown group {}", record.id);
                    report.skipped_groups.push(record.id);
                    continue;
                }
                GroupMode::Dynamic => {
                    store.insert(Group::new(record.id, record.color));
                }
            }
        }

        let members = resolve_members(record, registry, &mut report);
        let state = GroupState {
            is_pulse_active: record.is_pulse_active,
            is_static_active: record.is_static_active,
            is_twinkle_active: record.is_twinkle_active,
            color: record.color,
            members,
        };
        if store.replace(record.id, state).is_err() {
            report.skipped_groups.push(record.id);
            continue;
        }
        report.applied += 1;

        if let Some(group) = store.group(record.id) {
            for &led in group.members() {
                let color = if record.is_twinkle_active {
                    twinkle_color(palette, rng)
                } else {
                    record.color
                };
                report.paints.push((led, color));
            }
        }
    }

    report
}

fn resolve_members(
    record: &GroupRecord,
    registry: &LedRegistry,
    report: &mut LoadReport,
) -> Vec<LedHandle> {
    let mut members = Vec::with_capacity(record.member_count());

    for position in record.led_positions.iter().flatten() {
        match registry.find(*position) {
            Some(handle) => members.push(handle),
            None => {
                debug!(
                    "No LED at {} for group {}",
                    position.canonical(),
                    record.id
                );
                report.skipped_members += 1;
            }
        }
    }

    for &index in record.led_indices.iter().flatten() {
        let handle = usize::try_from(index)
            .ok()
            .and_then(|i| registry.handle(i));
        match handle {
            Some(handle) => members.push(handle),
            None => {
                debug!("No LED with index {} for group {}", index, record.id);
                report.skipped_members += 1;
            }
        }
    }

    members
}

/// Write a document to a JSON file
pub fn save_to_path<P: AsRef<Path>>(document: &SaveDocument, path: P) -> Result<()> {
    let json = document
        .to_json()
        .context("Failed to serialize save document")?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write save document: {:?}", path.as_ref()))
}

/// Read a document from a JSON file
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<SaveDocument> {
    let contents = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read save document: {:?}", path.as_ref()))?;
    SaveDocument::from_json(&contents)
        .with_context(|| format!("Failed to parse save document: {:?}", path.as_ref()))
}
