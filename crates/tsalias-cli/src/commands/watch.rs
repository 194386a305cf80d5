//! Watch mode.
//!
//! Flow:
//! 1. Prepare one rewriter per output directory (path cache disabled)
//! 2. Rewrite everything once
//! 3. Rewrite single files as the compiler writes them
//! 4. On a tsconfig change, reload the project and start over
//! 5. Stop on Ctrl+C

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{debug, warn};
use tsalias_core::{AliasRewriter, ReplacerRegistry, RunSummary};

use crate::cli::Cli;
use crate::commands::{prepare_rewriters, print_summary};
use crate::config::{LoadedProject, load_project};
use crate::error::Result;
use crate::ui;
use crate::watch::{DEFAULT_DEBOUNCE_MS, FileChange, FileWatcher};

/// Why the event loop stopped.
enum Stop {
    Reload,
    Shutdown,
}

/// Run watch mode until Ctrl+C.
pub async fn execute(cli: &Cli, mut loaded: LoadedProject, registry: &ReplacerRegistry) -> Result<()> {
    loop {
        // The path cache must not outlive a file system that keeps changing.
        loaded.config.watch = true;

        let rewriters = prepare_rewriters(&loaded.config, registry)?;
        let mut summary = RunSummary::default();
        for rewriter in &rewriters {
            summary.merge(rewriter.rewrite_all().await?);
        }
        print_summary(&summary);

        let roots = rewriters.iter().map(|r| r.out_dir().to_path_buf()).collect();
        let (watcher, mut change_rx) =
            FileWatcher::new(roots, loaded.config_file().to_path_buf(), DEFAULT_DEBOUNCE_MS)?;

        for root in watcher.roots() {
            ui::info(&format!("Watching for changes in: {}", root.display()));
        }
        ui::info("Press Ctrl+C to stop");

        let stop = loop {
            tokio::select! {
                Some(change) = change_rx.recv() => match change {
                    FileChange::Config(_) => break Stop::Reload,
                    FileChange::Created(path) | FileChange::Modified(path) => {
                        handle_output_change(&rewriters, &path).await;
                    }
                    FileChange::Removed(path) => {
                        debug!(file = %path.display(), "removed");
                    }
                },

                _ = signal::ctrl_c() => break Stop::Shutdown,
            }
        };
        drop(watcher);

        match stop {
            Stop::Shutdown => break,
            Stop::Reload => {
                ui::info("tsconfig changed, reloading");
                match load_project(cli) {
                    Ok(next) => loaded = next,
                    Err(e) => ui::error(&format!("Keeping the previous configuration: {}", e)),
                }
            }
        }
    }

    ui::success("Stopped watching");
    Ok(())
}

/// Rewrite one changed output file with the rewriter that owns it.
async fn handle_output_change(rewriters: &[Arc<AliasRewriter>], path: &Path) {
    let Some(rewriter) = rewriters.iter().find(|r| r.is_input(path)) else {
        return;
    };
    if !path.is_file() {
        return;
    }

    match rewriter.rewrite_file(path).await {
        Ok(true) => ui::success(&format!("Updated {}", display_relative(path, rewriter.out_dir()))),
        Ok(false) => debug!(file = %path.display(), "no aliased imports"),
        Err(e) => {
            warn!(file = %path.display(), "rewrite failed");
            ui::error(&format!("{}: {}", path.display(), e));
        }
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    let name = root.file_name().map(Path::new).unwrap_or(Path::new(""));
    match path.strip_prefix(root) {
        Ok(relative) => name.join(relative).display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
