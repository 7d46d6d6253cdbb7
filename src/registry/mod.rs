// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! LED registry.
//!
//! Owns the canonical ordering of every LED in the installation and provides
//! both addressing schemes used by show files:
//! - Position-keyed: canonical (rounded) position -> LED
//! - Index-keyed: flattened section/row/LED order -> LED
//!
//! The registry is built once from an installation layout and is immutable
//! afterwards.

pub mod order;
pub mod position;

pub use order::SectionOrder;
pub use position::{CanonicalPosition, Point3, POSITION_DECIMALS};

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use tracing::{debug, warn};

use crate::config::InstallationFile;
use crate::error::EngineError;

/// Opaque handle to one LED: its index in the flattened order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedHandle(usize);

impl LedHandle {
    /// Create a handle from a flattened index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Flattened index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED #{}", self.0)
    }
}

/// A caller-side reference to one or more LEDs
#[derive(Debug, Clone, PartialEq)]
pub enum LedRef {
    /// Flattened index
    Index(usize),
    /// Position (canonicalized before lookup)
    Position(Point3),
    /// One LED by section and offset within the section
    Section { section: usize, offset: usize },
    /// Contiguous LEDs within one section
    Range {
        section: usize,
        offset: usize,
        length: usize,
    },
    /// A whole row of a section
    Row { section: usize, row: usize },
}

/// A single LED's geometry
#[derive(Debug, Clone)]
pub struct Led {
    /// Position as given by the layout
    pub position: Point3,
    /// Rounded lookup key
    pub canonical: CanonicalPosition,
    /// Section index (after sorting)
    pub section: usize,
    /// Row index within the section
    pub row: usize,
}

/// Registry of all LEDs
#[derive(Debug, Clone, Default)]
pub struct LedRegistry {
    /// Flattened LEDs
    leds: Vec<Led>,
    /// Canonical position -> first LED seen there
    by_position: HashMap<CanonicalPosition, LedHandle>,
    /// LEDs whose position was already taken
    duplicates: Vec<LedHandle>,
    /// Section names in sorted order
    section_names: Vec<String>,
    /// Flattened start index of each section
    section_starts: Vec<usize>,
    /// Flattened start index of each row, per section
    row_starts: Vec<Vec<usize>>,
}

impl LedRegistry {
    /// Build the registry from an installation layout
    pub fn build(layout: &InstallationFile, order: SectionOrder) -> Self {
        let names: Vec<&str> = layout.sections.iter().map(|s| s.name.as_str()).collect();
        let sorted = order.sorted_indices(&names);

        let mut registry = Self::default();

        for (section_idx, &layout_idx) in sorted.iter().enumerate() {
            let section = &layout.sections[layout_idx];
            registry.section_names.push(section.name.clone());
            registry.section_starts.push(registry.leds.len());

            let mut rows = Vec::with_capacity(section.rows.len());
            for (row_idx, row) in section.rows.iter().enumerate() {
                rows.push(registry.leds.len());
                for point in row {
                    registry.push(Point3::from(*point), section_idx, row_idx);
                }
            }
            registry.row_starts.push(rows);
        }

        debug!(
            leds = registry.leds.len(),
            sections = registry.section_names.len(),
            duplicates = registry.duplicates.len(),
            "LED registry built"
        );
        registry
    }

    /// Build a single-section registry from a flat list of points
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        let layout = InstallationFile::single_section(
            "Section 1",
            points.into_iter().map(<[f32; 3]>::from).collect(),
        );
        Self::build(&layout, SectionOrder::Legacy)
    }

    fn push(&mut self, position: Point3, section: usize, row: usize) {
        let handle = LedHandle(self.leds.len());
        let canonical = position.canonical();

        if self.by_position.contains_key(&canonical) {
            warn!("Duplicate position detected for LED at {}", canonical);
            self.duplicates.push(handle);
        } else {
            self.by_position.insert(canonical, handle);
        }

        self.leds.push(Led {
            position,
            canonical,
            section,
            row,
        });
    }

    /// Number of LEDs
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// Check if the registry has no LEDs
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// All handles in flattened order
    pub fn handles(&self) -> impl Iterator<Item = LedHandle> + '_ {
        (0..self.leds.len()).map(LedHandle)
    }

    /// Check whether a handle belongs to this registry
    pub fn contains(&self, handle: LedHandle) -> bool {
        handle.0 < self.leds.len()
    }

    /// Handle for a flattened index
    pub fn handle(&self, index: usize) -> Option<LedHandle> {
        (index < self.leds.len()).then_some(LedHandle(index))
    }

    /// LED geometry
    pub fn led(&self, handle: LedHandle) -> Option<&Led> {
        self.leds.get(handle.0)
    }

    /// Position of an LED as given by the layout
    pub fn position_of(&self, handle: LedHandle) -> Option<Point3> {
        self.leds.get(handle.0).map(|l| l.position)
    }

    /// Canonical position of an LED
    pub fn canonical_position(&self, handle: LedHandle) -> Option<CanonicalPosition> {
        self.leds.get(handle.0).map(|l| l.canonical)
    }

    /// Find the LED at a position (rounded before lookup)
    pub fn find(&self, position: Point3) -> Option<LedHandle> {
        self.by_position.get(&position.canonical()).copied()
    }

    /// Find the LED with a canonical position
    pub fn find_canonical(&self, key: &CanonicalPosition) -> Option<LedHandle> {
        self.by_position.get(key).copied()
    }

    /// The LED that owns `handle`'s position key.
    ///
    /// Equal to `handle` except for duplicates, which map to the first LED
    /// seen at their position.
    pub fn canonical_handle(&self, handle: LedHandle) -> Option<LedHandle> {
        self.canonical_position(handle)
            .and_then(|key| self.find_canonical(&key))
    }

    /// LEDs dropped from the position lookup because their position was taken
    pub fn duplicates(&self) -> &[LedHandle] {
        &self.duplicates
    }

    /// Number of sections
    pub fn section_count(&self) -> usize {
        self.section_names.len()
    }

    /// Section names in sorted order
    pub fn section_names(&self) -> &[String] {
        &self.section_names
    }

    /// Name of one section
    pub fn section_name(&self, section: usize) -> Option<&str> {
        self.section_names.get(section).map(String::as_str)
    }

    /// Flattened start index of each section
    pub fn section_starts(&self) -> &[usize] {
        &self.section_starts
    }

    /// Flattened start index of each row in a section
    pub fn row_starts(&self, section: usize) -> Result<&[usize], EngineError> {
        self.check_section(section)?;
        Ok(&self.row_starts[section])
    }

    fn check_section(&self, section: usize) -> Result<(), EngineError> {
        if section >= self.section_names.len() {
            return Err(EngineError::SectionOutOfRange {
                section,
                count: self.section_names.len(),
            });
        }
        Ok(())
    }

    fn section_range(&self, section: usize) -> Result<Range<usize>, EngineError> {
        self.check_section(section)?;
        let start = self.section_starts[section];
        let end = self
            .section_starts
            .get(section + 1)
            .copied()
            .unwrap_or(self.leds.len());
        Ok(start..end)
    }

    /// Number of LEDs in a section
    pub fn section_len(&self, section: usize) -> Result<usize, EngineError> {
        Ok(self.section_range(section)?.len())
    }

    /// Look up a section by name
    pub fn section_by_name(&self, name: &str) -> Option<usize> {
        self.section_names.iter().position(|n| n == name)
    }

    /// One LED by section and offset within the section
    pub fn get_led(&self, section: usize, offset: usize) -> Result<LedHandle, EngineError> {
        let range = self.section_range(section)?;
        if offset >= range.len() {
            return Err(EngineError::LedOutOfRange {
                section,
                offset,
                end: offset + 1,
                len: range.len(),
            });
        }
        Ok(LedHandle(range.start + offset))
    }

    /// `length` contiguous LEDs starting at `offset` within one section.
    ///
    /// Ranges never continue into the next section.
    pub fn get_led_range(
        &self,
        section: usize,
        offset: usize,
        length: usize,
    ) -> Result<Vec<LedHandle>, EngineError> {
        let range = self.section_range(section)?;
        let end = offset.saturating_add(length);
        if length == 0 || end > range.len() {
            return Err(EngineError::LedOutOfRange {
                section,
                offset,
                end,
                len: range.len(),
            });
        }
        Ok((range.start + offset..range.start + end)
            .map(LedHandle)
            .collect())
    }

    /// All LEDs of one row
    pub fn row(&self, section: usize, row: usize) -> Result<Vec<LedHandle>, EngineError> {
        let section_range = self.section_range(section)?;
        let rows = &self.row_starts[section];
        let start = *rows.get(row).ok_or(EngineError::RowOutOfRange {
            section,
            row,
            count: rows.len(),
        })?;
        let end = rows.get(row + 1).copied().unwrap_or(section_range.end);
        Ok((start..end).map(LedHandle).collect())
    }

    /// Resolve a caller reference into handles
    pub fn resolve(&self, led_ref: &LedRef) -> Result<Vec<LedHandle>, EngineError> {
        match *led_ref {
            LedRef::Index(index) => self
                .handle(index)
                .map(|h| vec![h])
                .ok_or_else(|| EngineError::UnknownLed(format!("index {}", index))),
            LedRef::Position(point) => self
                .find(point)
                .map(|h| vec![h])
                .ok_or_else(|| EngineError::UnknownLed(format!("position {}", point.canonical()))),
            LedRef::Section { section, offset } => Ok(vec![self.get_led(section, offset)?]),
            LedRef::Range {
                section,
                offset,
                length,
            } => self.get_led_range(section, offset, length),
            LedRef::Row { section, row } => self.row(section, row),
        }
    }
}
