// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Errors surfaced by engine entry points.

use crate::color::ColorError;
use crate::groups::GroupId;

/// Error returned to the immediate caller of an engine operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Section index outside `[0, section_count)`
    #[error("section {section} is out of range ({count} sections)")]
    SectionOutOfRange { section: usize, count: usize },
    /// Offset/length outside the LEDs of one section
    #[error("LED range {offset}..{end} is invalid for section {section} ({len} LEDs)")]
    LedOutOfRange {
        section: usize,
        offset: usize,
        end: usize,
        len: usize,
    },
    /// Row index outside a section's rows
    #[error("row {row} is out of range for section {section} ({count} rows)")]
    RowOutOfRange {
        section: usize,
        row: usize,
        count: usize,
    },
    /// No group with this id exists
    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),
    /// An edit was requested before any group was selected
    #[error("no group is selected")]
    NoGroupSelected,
    /// A reference did not resolve to an LED in the registry
    #[error("no LED matches {0}")]
    UnknownLed(String),
    /// A color string failed to parse; the prior color is kept
    #[error(transparent)]
    MalformedColor(#[from] ColorError),
}

impl EngineError {
    /// Check if this is a bounds violation
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            EngineError::SectionOutOfRange { .. }
                | EngineError::LedOutOfRange { .. }
                | EngineError::RowOutOfRange { .. }
        )
    }
}
