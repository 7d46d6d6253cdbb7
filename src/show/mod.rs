// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Show playback.
//!
//! A show is a numbered series of save documents, `{show}/0`, `{show}/1`, ...
//! The player loads step `floor(t)` once scaled time reaches it. A step that
//! cannot be fetched or parsed is logged once and retried on every later
//! tick; playback does not move past it until it becomes available.

pub mod watcher;

pub use watcher::{ShowEvent, ShowWatcher};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::persistence::SaveDocument;

/// Show step loading errors
#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("show step {0} does not exist")]
    MissingResource(String),
    #[error("show step {key} is malformed: {message}")]
    Malformed { key: String, message: String },
    #[error("failed to read show step {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Resource key of one show step
pub fn resource_key(show: &str, step: i64) -> String {
    format!("{}/{}", show, step)
}

/// Supplies the raw text of show steps
pub trait ShowSource {
    /// Fetch the document text for one step
    fn fetch(&self, show: &str, step: i64) -> Result<String, ShowError>;

    /// Fetch and parse one step
    fn load_step(&self, show: &str, step: i64) -> Result<SaveDocument, ShowError> {
        let text = self.fetch(show, step)?;
        SaveDocument::from_json(&text).map_err(|e| ShowError::Malformed {
            key: resource_key(show, step),
            message: e.to_string(),
        })
    }
}

impl<T: ShowSource + ?Sized> ShowSource for &T {
    fn fetch(&self, show: &str, step: i64) -> Result<String, ShowError> {
        (**self).fetch(show, step)
    }
}

impl<T: ShowSource + ?Sized> ShowSource for Box<T> {
    fn fetch(&self, show: &str, step: i64) -> Result<String, ShowError> {
        (**self).fetch(show, step)
    }
}

/// Show steps stored as `{root}/{show}/{step}.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at a directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one step file
    pub fn step_path(&self, show: &str, step: i64) -> PathBuf {
        self.root.join(show).join(format!("{}.json", step))
    }
}

impl ShowSource for DirectorySource {
    fn fetch(&self, show: &str, step: i64) -> Result<String, ShowError> {
        let key = resource_key(show, step);
        fs::read_to_string(self.step_path(show, step)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ShowError::MissingResource(key),
            _ => ShowError::Io { key, source: e },
        })
    }
}

/// In-memory show steps
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    steps: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw document text for a step
    pub fn insert(&mut self, show: &str, step: i64, text: impl Into<String>) {
        self.steps.insert(resource_key(show, step), text.into());
    }

    /// Store a document for a step
    pub fn insert_document(&mut self, show: &str, step: i64, document: &SaveDocument) -> serde_json::Result<()> {
        let text = document.to_json()?;
        self.insert(show, step, text);
        Ok(())
    }

    /// Builder: add a document for a step
    pub fn with_document(mut self, show: &str, step: i64, document: &SaveDocument) -> serde_json::Result<Self> {
        self.insert_document(show, step, document)?;
        Ok(self)
    }

    /// Remove a step
    pub fn remove(&mut self, show: &str, step: i64) -> Option<String> {
        self.steps.remove(&resource_key(show, step))
    }

    /// Number of stored steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no steps are stored
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl ShowSource for MemorySource {
    fn fetch(&self, show: &str, step: i64) -> Result<String, ShowError> {
        let key = resource_key(show, step);
        self.steps
            .get(&key)
            .cloned()
            .ok_or(ShowError::MissingResource(key))
    }
}

/// Step counter and playing flag for one show
#[derive(Debug, Clone, PartialEq)]
pub struct ShowPlayer {
    show_name: String,
    /// Last step successfully loaded; -1 before the first
    last_loaded_step: i64,
    playing: bool,
    /// Step that failed to load and is being retried
    stalled_on: Option<i64>,
}

impl ShowPlayer {
    /// Create a stopped player
    pub fn new(show_name: impl Into<String>) -> Self {
        Self {
            show_name: show_name.into(),
            last_loaded_step: -1,
            playing: false,
            stalled_on: None,
        }
    }

    /// Show namespace
    pub fn show_name(&self) -> &str {
        &self.show_name
    }

    /// Last step loaded, -1 if none
    pub fn last_loaded_step(&self) -> i64 {
        self.last_loaded_step
    }

    /// Check if playback is enabled
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Step being retried after a failed load
    pub fn stalled_on(&self) -> Option<i64> {
        self.stalled_on
    }

    /// Start playback from step 0
    pub fn begin(&mut self) {
        self.playing = true;
        self.last_loaded_step = -1;
        self.stalled_on = None;
    }

    /// Stop playback; the step counter is kept
    pub fn end(&mut self) {
        self.playing = false;
    }

    /// Load the step due at scaled time `t`, if any
    pub fn poll<S: ShowSource + ?Sized>(&mut self, t: f64, source: &S) -> Option<SaveDocument> {
        if !self.playing || !t.is_finite() {
            return None;
        }
        let current = t.floor() as i64;
        if current <= self.last_loaded_step {
            return None;
        }

        let step = self.stalled_on.unwrap_or(current);
        match source.load_step(&self.show_name, step) {
            Ok(document) => {
                info!("Loaded show step {}", resource_key(&self.show_name, step));
                self.last_loaded_step = step;
                self.stalled_on = None;
                Some(document)
            }
            Err(e) => {
                if self.stalled_on != Some(step) {
                    warn!("Show playback stalled: {}", e);
                    self.stalled_on = Some(step);
                }
                None
            }
        }
    }

    /// Check if a file is the step currently on display
    pub fn is_current_step(&self, path: &Path) -> bool {
        let step = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok());
        let show = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str());
        step == Some(self.last_loaded_step) && show == Some(self.show_name.as_str())
    }
}
