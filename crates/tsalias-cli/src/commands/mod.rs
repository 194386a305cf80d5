//! Command implementations.
//!
//! - [`run`] - rewrite every output directory once
//! - [`watch`] - rewrite, then keep rewriting as files change
//!
//! Both take a [`ReplacerRegistry`] so embedders can register their own
//! replacers before the CLI runs.

pub mod run;
pub mod watch;

use std::sync::Arc;

use tsalias_core::{AliasRewriter, ProjectConfig, ReplacerRegistry, RunSummary};

use crate::cli::Cli;
use crate::config::LoadedProject;
use crate::error::Result;
use crate::ui;

pub use run::execute as run_execute;
pub use watch::execute as watch_execute;

/// Dispatch on `--watch`.
pub async fn execute(cli: &Cli, loaded: LoadedProject, registry: &ReplacerRegistry) -> Result<()> {
    if cli.watch {
        watch::execute(cli, loaded, registry).await
    } else {
        run::execute(&loaded, registry).await.map(|_| ())
    }
}

/// One rewriter per output directory that exists.
pub(crate) fn prepare_rewriters(
    config: &ProjectConfig,
    registry: &ReplacerRegistry,
) -> Result<Vec<Arc<AliasRewriter>>> {
    let rewriters = config
        .existing_output_dirs()?
        .iter()
        .map(|dir| AliasRewriter::prepare_for_dir(config, registry, dir).map(Arc::new))
        .collect::<tsalias_core::Result<Vec<_>>>()?;
    Ok(rewriters)
}

/// Print the human-facing outcome of a batch.
pub(crate) fn print_summary(summary: &RunSummary) {
    if summary.changed == 0 {
        ui::info(&format!(
            "No aliased imports to rewrite ({} files scanned)",
            summary.scanned
        ));
    } else {
        ui::success(&format!(
            "{} {} updated",
            summary.changed,
            if summary.changed == 1 { "file" } else { "files" }
        ));
    }

    for (file, err) in &summary.failed {
        ui::error(&format!("{}: {}", file.display(), err));
    }
}
