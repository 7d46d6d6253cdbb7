// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Section ordering rules.
//!
//! The flattened LED index depends on section order, so index-addressed show
//! files are only portable between installations that sort sections the same
//! way.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// How sections are ordered when the registry flattens them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionOrder {
    /// Compatible with existing index-addressed show files.
    ///
    /// Names with the same number of space-separated tokens compare by the
    /// integer in the second token. Names with different token counts put
    /// the longer raw name first.
    #[default]
    Legacy,
    /// Ascending by trailing number, then by name
    Natural,
}

impl SectionOrder {
    /// Compare two section names
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SectionOrder::Legacy => legacy_compare(a, b),
            SectionOrder::Natural => natural_compare(a, b),
        }
    }

    /// Return the indices of `names` in sorted order
    pub fn sorted_indices<S: AsRef<str>>(&self, names: &[S]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..names.len()).collect();
        // Insertion sort; the legacy comparator is not a total order
        for i in 1..order.len() {
            let mut j = i;
            while j > 0
                && self.compare(names[order[j - 1]].as_ref(), names[order[j]].as_ref())
                    == Ordering::Greater
            {
                order.swap(j - 1, j);
                j -= 1;
            }
        }
        order
    }
}

fn legacy_compare(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split(' ').collect();
    let b_parts: Vec<&str> = b.split(' ').collect();

    if a_parts.len() == b_parts.len() {
        let a_num = a_parts.get(1).and_then(|s| s.parse::<i64>().ok());
        let b_num = b_parts.get(1).and_then(|s| s.parse::<i64>().ok());
        match (a_num, b_num) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.cmp(b),
        }
    } else {
        // Longer name first
        b.chars().count().cmp(&a.chars().count())
    }
}

fn trailing_number(name: &str) -> Option<i64> {
    name.split_whitespace().last()?.parse().ok()
}

fn natural_compare(a: &str, b: &str) -> Ordering {
    match (trailing_number(a), trailing_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted<'a>(order: SectionOrder, names: &[&'a str]) -> Vec<&'a str> {
        order
            .sorted_indices(names)
            .into_iter()
            .map(|i| names[i])
            .collect()
    }

    #[test]
    fn test_legacy_numeric_within_same_shape() {
        let names = ["Section 10", "Section 2", "Section 1"];
        assert_eq!(
            sorted(SectionOrder::Legacy, &names),
            vec!["Section 1", "Section 2", "Section 10"]
        );
    }

    #[test]
    fn test_legacy_longer_name_first_when_token_counts_differ() {
        let names = ["Section 1", "Upper Section 1", "Section 2"];
        assert_eq!(
            sorted(SectionOrder::Legacy, &names),
            vec!["Upper Section 1", "Section 1", "Section 2"]
        );
    }

    #[test]
    fn test_legacy_unparseable_falls_back_to_name() {
        assert_eq!(legacy_compare("Section B", "Section A"), Ordering::Greater);
        assert_eq!(legacy_compare("North", "East"), Ordering::Greater);
    }

    #[test]
    fn test_legacy_cycle_still_terminates() {
        // "s 1" < "sect 2" by number, "sect 2" before "a b c" by length,
        // "a b c" before "s 1" by length: no total order exists.
        let names = ["s 1", "sect 2", "a b c"];
        let order = SectionOrder::Legacy.sorted_indices(&names);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_natural_order() {
        let names = ["Upper Section 3", "Section 10", "Field", "Section 2"];
        assert_eq!(
            sorted(SectionOrder::Natural, &names),
            vec!["Section 2", "Upper Section 3", "Section 10", "Field"]
        );
    }
}
