// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Frame export: turn a painted frame into an index-addressed show step.

use std::collections::HashMap;

use super::{GroupRecord, SaveDocument};
use crate::color::Color;
use crate::groups::GroupId;

/// Build a document with one group per distinct color.
///
/// Groups are numbered from 1 in order of first appearance and list their
/// LEDs by flattened index. Colors match exactly, alpha included.
pub fn document_from_colors(colors: &[Color]) -> SaveDocument {
    let mut by_color: HashMap<[u32; 4], usize> = HashMap::new();
    let mut groups: Vec<GroupRecord> = Vec::new();

    for (index, color) in colors.iter().enumerate() {
        let key = [
            color.r.to_bits(),
            color.g.to_bits(),
            color.b.to_bits(),
            color.a.to_bits(),
        ];
        let slot = *by_color.entry(key).or_insert_with(|| {
            groups.push(GroupRecord {
                id: (groups.len() + 1) as GroupId,
                color: *color,
                led_indices: Some(Vec::new()),
                ..GroupRecord::default()
            });
            groups.len() - 1
        });
        if let Some(indices) = groups[slot].led_indices.as_mut() {
            indices.push(index as i64);
        }
    }

    SaveDocument { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_color() {
        let red = Color::new(1.0, 0.0, 0.0);
        let blue = Color::new(0.0, 0.0, 1.0);
        let doc = document_from_colors(&[red, blue, red, Color::BLACK, blue]);

        assert_eq!(doc.groups.len(), 3);
        assert_eq!(doc.groups[0].id, 1);
        assert_eq!(doc.groups[0].color, red);
        assert_eq!(doc.groups[0].led_indices, Some(vec![0, 2]));
        assert_eq!(doc.groups[1].led_indices, Some(vec![1, 4]));
        assert_eq!(doc.groups[2].id, 3);
        assert_eq!(doc.groups[2].led_indices, Some(vec![3]));
        assert!(doc.groups.iter().all(|g| !g.is_twinkle_active && g.led_positions.is_none()));
    }

    #[test]
    fn test_alpha_splits_groups() {
        let solid = Color::WHITE;
        let faded = Color::WHITE.with_alpha(0.5);
        let doc = document_from_colors(&[solid, faded]);
        assert_eq!(doc.groups.len(), 2);
    }

    #[test]
    fn test_empty_frame() {
        assert!(document_from_colors(&[]).groups.is_empty());
    }
}
