//! Error handling for the tsalias CLI.
//!
//! [`CliError`] is what every command returns. Engine failures arrive as
//! [`RewriteError`] and keep their own hints; tsconfig and settings problems
//! are [`ConfigError`]s. At `main` the error is turned into a miette report
//! for the final diagnostic and the non-zero exit code.

use std::path::PathBuf;

use thiserror::Error;
use tsalias_core::RewriteError;

mod miette;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// tsconfig or settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The engine refused to run or a batch could not start
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Some files could not be rewritten; the rest were
    #[error("{failed} of {scanned} files could not be rewritten")]
    FilesFailed {
        failed: usize,
        scanned: usize,
    },

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Errors from locating, parsing and merging tsconfig files and settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The project tsconfig doesn't exist
    #[error("tsconfig not found: {}\n\nHint: Run from the project root or pass --project <path>", .0.display())]
    NotFound(PathBuf),

    /// A tsconfig file is not valid JSON, even with comments and trailing commas allowed
    #[error("Invalid JSON in {}: {source}\n\nHint: Check the file for unbalanced braces or missing commas", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An `extends` entry could not be resolved to a file
    #[error("Cannot resolve \"extends\": \"{extends}\" in {}\n\nHint: Use a relative path or the name of an installed package", .from.display())]
    ExtendsNotFound {
        extends: String,
        from: PathBuf,
    },

    /// A tsconfig extends itself, directly or through other files
    #[error("Circular \"extends\" chain at {}\n\nHint: Remove the cycle from the extends entries", .0.display())]
    CircularExtends(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
