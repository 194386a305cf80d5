//! File watching for `--watch`.

mod watcher;

pub use watcher::{DEFAULT_DEBOUNCE_MS, FileChange, FileWatcher};
