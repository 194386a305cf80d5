//! Output-directory watcher with debouncing.
//!
//! Watches each output root recursively and the directory holding the
//! tsconfig (non-recursively, so editors that replace the file on save are
//! still seen). Events under `node_modules` or outside the roots are dropped.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{CliError, Result};

/// Debounce window for repeated events on the same path.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
    /// The watched tsconfig changed in any way
    Config(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p)
            | FileChange::Created(p)
            | FileChange::Removed(p)
            | FileChange::Config(p) => p,
        }
    }
}

/// Watches output roots and the tsconfig, sending changes through a channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `roots` recursively and `config_file` on its own.
    ///
    /// Fails if a root does not exist or the platform watcher cannot be
    /// created.
    pub fn new(
        roots: Vec<PathBuf>,
        config_file: PathBuf,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if let Some(missing) = roots.iter().find(|root| !root.is_dir()) {
            return Err(CliError::FileNotFound(missing.clone()));
        }

        let (tx, rx) = mpsc::channel(256);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let watched_roots = roots.clone();
        let watched_config = config_file.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    debug!("watch error: {err}");
                    return;
                }
            };

            for path in &event.paths {
                let is_config = *path == watched_config;
                if !is_config && Self::should_ignore(path, &watched_roots) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }

                let change = match (is_config, event.kind) {
                    (true, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) => {
                        FileChange::Config(path.clone())
                    }
                    (false, EventKind::Create(_)) => FileChange::Created(path.clone()),
                    (false, EventKind::Modify(_)) => FileChange::Modified(path.clone()),
                    (false, EventKind::Remove(_)) => FileChange::Removed(path.clone()),
                    _ => continue,
                };
                last_event = Some((path.clone(), now));

                // The receiver is gone once the watch loop stops.
                let _ = tx.blocking_send(change);
            }
        })?;

        for root in &roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
        }
        if let Some(config_dir) = config_file.parent() {
            watcher.watch(config_dir, RecursiveMode::NonRecursive)?;
        }

        Ok((
            Self {
                _watcher: watcher,
                roots,
            },
            rx,
        ))
    }

    /// Whether an event on `path` is irrelevant: outside every root, or
    /// inside a `node_modules` directory below one.
    fn should_ignore(path: &Path, roots: &[PathBuf]) -> bool {
        let Some(relative) = roots.iter().find_map(|root| path.strip_prefix(root).ok()) else {
            return true;
        };

        relative
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"))
    }

    /// The output roots being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
