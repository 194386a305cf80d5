//! One-shot rewrite of a compiled project.

use tracing::debug;
use tsalias_core::{ReplacerRegistry, RunSummary, rewrite_project_with};

use crate::commands::print_summary;
use crate::config::LoadedProject;
use crate::error::{CliError, Result};

/// Rewrite the output directory, and the declaration directory when it is
/// separate.
///
/// Replacers that fail to load and aliases that do not resolve are
/// warnings. Any file that could not be rewritten makes the command fail
/// after the rest of the batch has finished.
pub async fn execute(loaded: &LoadedProject, registry: &ReplacerRegistry) -> Result<RunSummary> {
    debug!(config = %loaded.config_file().display(), "starting rewrite");

    let summary = rewrite_project_with(&loaded.config, registry).await?;
    print_summary(&summary);

    if !summary.is_success() {
        return Err(CliError::FilesFailed {
            failed: summary.failed.len(),
            scanned: summary.scanned,
        });
    }
    Ok(summary)
}
