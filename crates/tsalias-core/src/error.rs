//! Error types for the alias rewrite engine.
//!
//! The taxonomy follows how failures are handled by a run:
//!
//! - **Configuration preconditions** (`MissingField`, `InvalidValue`, `InvalidGlob`)
//!   are fatal and surface before any file is touched.
//! - **Per-file failures** (`Io`, `MalformedStatement`) abort only the file they
//!   occurred in; the batch driver records them and keeps going.
//! - **Replacer load failures** are not errors at all, see [`ReplacerLoadError`].
//!
//! An alias that cannot be resolved is not an error either: the statement is left
//! untouched and a warning is logged.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using `RewriteError` as the default error type.
pub type Result<T, E = RewriteError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RewriteError {
    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field (tsconfig spelling)
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    /// The input glob could not be compiled
    #[error("Invalid input glob: {0}")]
    InvalidGlob(#[from] globset::Error),

    /// The scanner matched a statement but no specifier could be extracted from it.
    ///
    /// Indicates the statement grammar and the specifier grammar disagree.
    #[error("Unexpected import statement pattern in {}: {statement}", .file.display())]
    MalformedStatement { file: PathBuf, statement: String },

    /// I/O error with the path that caused it
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to walk an output directory
    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file task panicked or was cancelled
    #[error("Rewrite task failed: {0}")]
    Task(String),
}

impl RewriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// An output directory named by `field` is not on disk.
    pub(crate) fn missing_dir(field: &str, dir: &Path) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: dir.display().to_string(),
            hint: "The directory does not exist. Run the compiler first".to_string(),
        }
    }

    /// Whether this error is a configuration precondition failure.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidValue { .. } | Self::InvalidGlob(_)
        )
    }
}

/// A replacer that was enabled in configuration but could not be instantiated.
///
/// Reported as a warning; the remaining replacers still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load replacer \"{name}\": {reason}")]
pub struct ReplacerLoadError {
    pub name: String,
    pub reason: String,
}
