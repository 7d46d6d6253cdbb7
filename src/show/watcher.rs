// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for hand-edited show steps.
//!
//! Watches a show directory and emits an event when a `.json` step file is
//! modified, so the step on display can be re-applied without restarting
//! playback.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::persistence::{self, SaveDocument};

/// Events emitted by the show watcher
#[derive(Debug, Clone)]
pub enum ShowEvent {
    /// A step file was modified and parsed
    Reloaded {
        path: PathBuf,
        document: Box<SaveDocument>,
    },
    /// A step file was modified but failed to parse
    Error(String),
    /// A new file appeared
    FileCreated(PathBuf),
    /// A file was removed
    FileDeleted(PathBuf),
}

/// Debouncing watcher over a show directory
pub struct ShowWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<ShowEvent>,
    watched_path: PathBuf,
}

fn is_step_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

fn reload(path: PathBuf) -> ShowEvent {
    match persistence::load_from_path(&path) {
        Ok(document) => ShowEvent::Reloaded {
            path,
            document: Box::new(document),
        },
        Err(e) => ShowEvent::Error(format!("Failed to load {:?}: {:#}", path, e)),
    }
}

impl ShowWatcher {
    /// Watch a directory (recursively) or a single step file.
    ///
    /// Modifications are reported once no further change has arrived for
    /// `debounce_ms` milliseconds (500 if `None`).
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(500));

        let (event_tx, event_rx): (Sender<ShowEvent>, Receiver<ShowEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        let mode = if watched_path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&watched_path, mode)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let mut pending_paths: Vec<PathBuf> = Vec::new();

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(event) => match event.kind {
                        EventKind::Create(_) => {
                            for path in event.paths {
                                let _ = event_tx.send(ShowEvent::FileCreated(path));
                            }
                        }
                        EventKind::Remove(_) => {
                            for path in event.paths {
                                let _ = event_tx.send(ShowEvent::FileDeleted(path));
                            }
                        }
                        EventKind::Modify(_) => {
                            for path in event.paths {
                                if is_step_file(&path) && !pending_paths.contains(&path) {
                                    pending_paths.push(path);
                                }
                            }
                            last_event_time = Some(Instant::now());
                        }
                        _ => {}
                    },
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(last_time) = last_event_time {
                            if last_time.elapsed() >= debounce_duration {
                                for path in pending_paths.drain(..) {
                                    let _ = event_tx.send(reload(path));
                                }
                                last_event_time = None;
                            }
                        }
                    }
                    // Watcher dropped
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Next pending event, if any
    pub fn try_recv(&self) -> Option<ShowEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// All pending events
    pub fn recv_all(&self) -> Vec<ShowEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}
