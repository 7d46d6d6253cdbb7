// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Group store.
//!
//! Groups are small-integer-keyed records holding an effect configuration,
//! a color, and an ordered member list. An LED belongs to at most one group:
//! every insertion first removes the LED from its current owner.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::error::EngineError;
use crate::registry::LedHandle;

/// Group identifier
pub type GroupId = u32;

/// The three independent group effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    /// Time-driven brightness oscillation
    Pulse,
    /// Step-quantized random recoloring
    Static,
    /// Random palette recolor applied at load time
    Twinkle,
}

impl EffectKind {
    /// All effects in evaluation order
    pub const ALL: [EffectKind; 3] = [EffectKind::Pulse, EffectKind::Static, EffectKind::Twinkle];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Pulse => "Pulse",
            EffectKind::Static => "Static",
            EffectKind::Twinkle => "Twinkle",
        }
    }
}

/// How groups come into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// A fixed set of ids created up front; unknown ids in documents are skipped
    #[default]
    Fixed,
    /// Groups are created by selection and by loaded documents; loading
    /// replaces the whole store
    Dynamic,
}

/// A group of LEDs sharing a color and effect configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: GroupId,
    is_pulse_active: bool,
    is_static_active: bool,
    is_twinkle_active: bool,
    color: Color,
    members: Vec<LedHandle>,
}

impl Group {
    /// Create an empty group with all effects off
    pub fn new(id: GroupId, color: Color) -> Self {
        Self {
            id,
            is_pulse_active: false,
            is_static_active: false,
            is_twinkle_active: false,
            color,
            members: Vec::new(),
        }
    }

    /// Create an empty group with a random color
    pub fn with_random_color<R: Rng + ?Sized>(id: GroupId, rng: &mut R) -> Self {
        Self::new(id, Color::random(rng))
    }

    /// Group id
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Group color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Member LEDs in insertion order
    pub fn members(&self) -> &[LedHandle] {
        &self.members
    }

    /// Check if an effect is enabled
    pub fn effect(&self, kind: EffectKind) -> bool {
        match kind {
            EffectKind::Pulse => self.is_pulse_active,
            EffectKind::Static => self.is_static_active,
            EffectKind::Twinkle => self.is_twinkle_active,
        }
    }

    /// Pulse flag
    pub fn is_pulse_active(&self) -> bool {
        self.is_pulse_active
    }

    /// Static flag
    pub fn is_static_active(&self) -> bool {
        self.is_static_active
    }

    /// Twinkle flag
    pub fn is_twinkle_active(&self) -> bool {
        self.is_twinkle_active
    }

    /// Builder: enable an effect
    pub fn with_effect(mut self, kind: EffectKind) -> Self {
        self.set_effect(kind, true);
        self
    }

    fn set_effect(&mut self, kind: EffectKind, enabled: bool) {
        match kind {
            EffectKind::Pulse => self.is_pulse_active = enabled,
            EffectKind::Static => self.is_static_active = enabled,
            EffectKind::Twinkle => self.is_twinkle_active = enabled,
        }
    }
}

/// Flags, color and members that replace a group wholesale
#[derive(Debug, Clone, PartialEq)]
pub struct GroupState {
    pub is_pulse_active: bool,
    pub is_static_active: bool,
    pub is_twinkle_active: bool,
    pub color: Color,
    pub members: Vec<LedHandle>,
}

/// Store of all groups plus the current selection
#[derive(Debug, Clone)]
pub struct GroupStore {
    mode: GroupMode,
    /// Groups in creation order
    groups: Vec<Group>,
    /// LED -> owning group
    owners: HashMap<LedHandle, GroupId>,
    /// Group targeted by edits
    selected: Option<GroupId>,
}

impl GroupStore {
    /// Create groups `1..=count` with random colors; group 1 is selected
    pub fn fixed<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Self {
        let groups = (1..=count)
            .map(|id| Group::with_random_color(id, rng))
            .collect();
        Self {
            mode: GroupMode::Fixed,
            groups,
            owners: HashMap::new(),
            selected: (count > 0).then_some(1),
        }
    }

    /// Create an empty store whose groups come from documents or selection
    pub fn dynamic() -> Self {
        Self {
            mode: GroupMode::Dynamic,
            groups: Vec::new(),
            owners: HashMap::new(),
            selected: None,
        }
    }

    /// Group creation mode
    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// All groups in creation order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Get a group by id
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Check if a group exists
    pub fn contains(&self, id: GroupId) -> bool {
        self.group(id).is_some()
    }

    /// Currently selected group id
    pub fn selected(&self) -> Option<GroupId> {
        self.selected
    }

    /// Currently selected group
    pub fn selected_group(&self) -> Option<&Group> {
        self.selected.and_then(|id| self.group(id))
    }

    fn selected_mut(&mut self) -> Result<&mut Group, EngineError> {
        let id = self.selected.ok_or(EngineError::NoGroupSelected)?;
        self.group_mut(id).ok_or(EngineError::UnknownGroup(id))
    }

    /// Group that owns an LED
    pub fn owner_of(&self, led: LedHandle) -> Option<GroupId> {
        self.owners.get(&led).copied()
    }

    /// Total memberships across all groups
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Select the group targeted by subsequent edits.
    ///
    /// In dynamic mode a missing group is created with a random color.
    pub fn select<R: Rng + ?Sized>(&mut self, id: GroupId, rng: &mut R) -> Result<(), EngineError> {
        if !self.contains(id) {
            match self.mode {
                GroupMode::Fixed => return Err(EngineError::UnknownGroup(id)),
                GroupMode::Dynamic => self.groups.push(Group::with_random_color(id, rng)),
            }
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Insert a group if the id is free; returns false if it existed
    pub fn insert(&mut self, group: Group) -> bool {
        if self.contains(group.id) {
            return false;
        }
        for led in &group.members {
            self.owners.insert(*led, group.id);
        }
        self.groups.push(group);
        true
    }

    /// Remove LEDs from whichever groups own them; one pass per affected group
    fn release_all(&mut self, leds: &[LedHandle]) {
        let mut released: HashMap<GroupId, HashSet<LedHandle>> = HashMap::new();
        for &led in leds {
            if let Some(owner) = self.owners.remove(&led) {
                released.entry(owner).or_default().insert(led);
            }
        }
        if released.is_empty() {
            return;
        }
        for group in &mut self.groups {
            if let Some(gone) = released.get(&group.id) {
                group.members.retain(|m| !gone.contains(m));
            }
        }
    }

    /// Move LEDs into the selected group; returns the group's color
    pub fn assign(&mut self, leds: &[LedHandle]) -> Result<Color, EngineError> {
        let id = self.selected_mut()?.id;
        self.release_all(leds);

        let mut added = Vec::with_capacity(leds.len());
        for &led in leds {
            if self.owners.insert(led, id).is_none() {
                added.push(led);
            }
        }
        let group = self.selected_mut()?;
        group.members.extend(added);
        let color = group.color;
        debug!(group = id, count = leds.len(), "LEDs added to group");
        Ok(color)
    }

    /// Set the selected group's color; returns its members for recoloring
    pub fn set_color(&mut self, color: Color) -> Result<&[LedHandle], EngineError> {
        let group = self.selected_mut()?;
        group.color = color;
        Ok(&group.members)
    }

    /// Toggle one effect on the selected group
    pub fn set_effect(&mut self, kind: EffectKind, enabled: bool) -> Result<GroupId, EngineError> {
        let group = self.selected_mut()?;
        group.set_effect(kind, enabled);
        debug!(
            "{} effect {} for group {}",
            kind.name(),
            if enabled { "enabled" } else { "disabled" },
            group.id
        );
        Ok(group.id)
    }

    /// Replace a group's flags, color and members wholesale.
    ///
    /// Members are taken from their previous owners; duplicates within
    /// `state.members` keep their first occurrence.
    pub fn replace(&mut self, id: GroupId, state: GroupState) -> Result<(), EngineError> {
        if !self.contains(id) {
            return Err(EngineError::UnknownGroup(id));
        }

        let old_members = self
            .group_mut(id)
            .map(|g| std::mem::take(&mut g.members))
            .unwrap_or_default();
        for led in old_members {
            self.owners.remove(&led);
        }

        let mut seen = HashSet::with_capacity(state.members.len());
        let members: Vec<LedHandle> = state
            .members
            .into_iter()
            .filter(|led| seen.insert(*led))
            .collect();
        self.release_all(&members);
        for &led in &members {
            self.owners.insert(led, id);
        }

        if let Some(group) = self.group_mut(id) {
            group.is_pulse_active = state.is_pulse_active;
            group.is_static_active = state.is_static_active;
            group.is_twinkle_active = state.is_twinkle_active;
            group.color = state.color;
            group.members = members;
        }
        Ok(())
    }

    /// Remove every group and membership (the selection id is kept)
    pub fn clear(&mut self) {
        self.groups.clear();
        self.owners.clear();
    }
}
