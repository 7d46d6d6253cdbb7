// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Command queue for driving one engine from several callers.
//!
//! Callers hold a cloneable [`CommandSender`]; the controller drains the
//! queue at the top of every tick, so all group store mutation happens on the
//! tick thread in arrival order.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::color::Color;
use crate::groups::{EffectKind, GroupId};
use crate::persistence::SaveDocument;
use crate::registry::LedRef;

/// Action applied to the engine on the tick thread
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Select the group targeted by edits
    SelectGroup(GroupId),
    /// Add LEDs to the selected group
    AddToGroup(Vec<LedRef>),
    /// Set the selected group's color
    SetGroupColor(Color),
    /// Set the selected group's color from a hex string
    SetGroupColorHex(String),
    /// Toggle an effect on the selected group
    SetEffect(EffectKind, bool),
    /// Start show playback
    BeginShow,
    /// Stop show playback
    EndShow,
    /// Apply a save document
    Load(Box<SaveDocument>),
    /// Snapshot the group store and send it back
    Save(Sender<SaveDocument>),
}

impl EngineCommand {
    /// Check if this command edits the group store
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            EngineCommand::SelectGroup(_)
                | EngineCommand::AddToGroup(_)
                | EngineCommand::SetGroupColor(_)
                | EngineCommand::SetGroupColorHex(_)
                | EngineCommand::SetEffect(_, _)
                | EngineCommand::Load(_)
        )
    }

    /// Check if this is a playback command
    pub fn is_transport(&self) -> bool {
        matches!(self, EngineCommand::BeginShow | EngineCommand::EndShow)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::SelectGroup(_) => "select_group",
            EngineCommand::AddToGroup(_) => "add_to_group",
            EngineCommand::SetGroupColor(_) => "set_group_color",
            EngineCommand::SetGroupColorHex(_) => "set_group_color_hex",
            EngineCommand::SetEffect(_, _) => "set_effect",
            EngineCommand::BeginShow => "begin_show",
            EngineCommand::EndShow => "end_show",
            EngineCommand::Load(_) => "load",
            EngineCommand::Save(_) => "save",
        }
    }
}

/// The engine is gone and no longer accepts commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("engine command queue is closed")]
pub struct QueueClosed;

/// Cloneable handle for submitting commands
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<EngineCommand>,
}

impl CommandSender {
    /// Submit a command
    pub fn send(&self, command: EngineCommand) -> Result<(), QueueClosed> {
        self.sender.send(command).map_err(|_| QueueClosed)
    }

    /// Queue a group selection
    pub fn select_group(&self, id: GroupId) -> Result<(), QueueClosed> {
        self.send(EngineCommand::SelectGroup(id))
    }

    /// Queue LEDs for the selected group
    pub fn add_to_group(&self, refs: Vec<LedRef>) -> Result<(), QueueClosed> {
        self.send(EngineCommand::AddToGroup(refs))
    }

    /// Queue a color change
    pub fn set_group_color(&self, color: Color) -> Result<(), QueueClosed> {
        self.send(EngineCommand::SetGroupColor(color))
    }

    /// Queue an effect toggle
    pub fn set_effect(&self, kind: EffectKind, enabled: bool) -> Result<(), QueueClosed> {
        self.send(EngineCommand::SetEffect(kind, enabled))
    }

    /// Request a snapshot; the document arrives on the returned receiver
    /// once the next tick has run
    pub fn request_save(&self) -> Result<Receiver<SaveDocument>, QueueClosed> {
        let (tx, rx) = mpsc::channel();
        self.send(EngineCommand::Save(tx))?;
        Ok(rx)
    }
}

/// Receiving end of the command queue
#[derive(Debug)]
pub struct CommandQueue {
    sender: Sender<EngineCommand>,
    receiver: Receiver<EngineCommand>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Create a handle for submitting commands
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Take every pending command in arrival order
    pub fn drain(&self) -> Vec<EngineCommand> {
        self.receiver.try_iter().collect()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
