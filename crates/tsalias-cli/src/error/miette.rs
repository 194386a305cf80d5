//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use tsalias_core::RewriteError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Rewrite(e) => rewrite_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert an engine error to a miette Report
pub fn rewrite_error_to_miette(err: RewriteError) -> Report {
    match err {
        RewriteError::MalformedStatement { file, statement } => miette::miette!(
            "Could not read the import specifier in {}:\n  {}\n\nHint: This usually means a string literal looked like an import",
            file.display(),
            statement
        ),
        err if err.is_config() => miette::miette!("Configuration error: {}", err),
        _ => miette::miette!("{}", err),
    }
}
