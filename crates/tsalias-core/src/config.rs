//! Normalized project configuration consumed by the engine.
//!
//! Loading tsconfig files, following `extends` chains and merging CLI flags is
//! the caller's job; the engine receives this already-flattened structure.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, RewriteError};
use crate::paths::absolutize;

/// Input glob (extension part) used when none is configured.
pub const DEFAULT_INPUT_GLOB: &str = "{mjs,cjs,js,jsx,d.mts,d.cts,d.ts,d.tsx}";

pub const OUT_DIR_FIELD: &str = "compilerOptions.outDir";
pub const DECLARATION_DIR_FIELD: &str = "compilerOptions.declarationDir";

/// `paths` as written in tsconfig: alias pattern to ordered candidate list.
pub type PathAliases = IndexMap<String, Vec<String>>;

/// Replacer switches keyed by replacer name, in declaration order.
pub type ReplacerOptions = IndexMap<String, ReplacerOption>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacerOption {
    #[serde(default)]
    pub enabled: bool,

    /// Where the replacer came from, for replacers registered by file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ReplacerOption {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExtensions {
    /// Extension glob of files to rewrite, e.g. `{js,mjs}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_glob: Option<String>,

    /// Extensions probed when checking whether an aliased module exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_check: Option<Vec<String>>,
}

/// Everything one run needs to know about the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// The tsconfig this configuration was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// Directory containing the tsconfig; relative paths resolve against it
    pub config_dir: PathBuf,

    /// `compilerOptions.baseUrl`, relative to `config_dir`
    #[serde(default)]
    pub base_url: String,

    /// `compilerOptions.outDir`; required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// `compilerOptions.declarationDir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_dir: Option<PathBuf>,

    /// `compilerOptions.paths`
    #[serde(default)]
    pub paths: PathAliases,

    #[serde(default)]
    pub replacers: ReplacerOptions,

    /// Append the real file extension to relative imports
    #[serde(default)]
    pub resolve_full_paths: bool,

    #[serde(default)]
    pub file_extensions: FileExtensions,

    /// Watch mode; disables the path cache
    #[serde(default)]
    pub watch: bool,
}

impl ProjectConfig {
    /// Minimal configuration rooted at `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(out_dir.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_alias<I, S>(mut self, pattern: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.insert(
            pattern.into(),
            candidates.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Check the preconditions of a run. Nothing is read or written.
    pub fn validate(&self) -> Result<()> {
        if self.out_dir.is_none() {
            return Err(RewriteError::MissingField {
                field: OUT_DIR_FIELD.to_string(),
                hint: "Set outDir in tsconfig.json or pass --dir <dir>".to_string(),
            });
        }

        if let Some(glob) = self.file_extensions.input_glob.as_deref() {
            if glob.trim().is_empty() {
                return Err(RewriteError::InvalidValue {
                    field: "fileExtensions.inputGlob".to_string(),
                    value: glob.to_string(),
                    hint: "Use an extension glob such as {js,mjs}".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Absolute, cleaned configuration directory.
    pub fn config_dir_abs(&self) -> PathBuf {
        absolutize(&self.config_dir)
    }

    /// Absolute output directory, if configured.
    pub fn out_dir_abs(&self) -> Option<PathBuf> {
        self.out_dir.as_deref().map(|dir| self.resolve_from_config(dir))
    }

    /// Absolute declaration directory, if configured.
    pub fn declaration_dir_abs(&self) -> Option<PathBuf> {
        self.declaration_dir
            .as_deref()
            .map(|dir| self.resolve_from_config(dir))
    }

    /// Directories a run rewrites: the output directory, then the
    /// declaration directory when it is set and different.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.out_dir_abs().into_iter().collect();
        if let Some(declaration_dir) = self.declaration_dir_abs() {
            if !dirs.contains(&declaration_dir) {
                dirs.push(declaration_dir);
            }
        }
        dirs
    }

    /// [`output_dirs`](Self::output_dirs) that exist on disk.
    ///
    /// A missing output directory is an error. A missing declaration
    /// directory only has nothing to rewrite, so it is skipped with a warning.
    pub fn existing_output_dirs(&self) -> Result<Vec<PathBuf>> {
        self.validate()?;

        let mut dirs = Vec::new();
        for dir in self.output_dirs() {
            if dir.is_dir() {
                dirs.push(dir);
            } else if Some(&dir) == self.out_dir_abs().as_ref() {
                return Err(RewriteError::missing_dir(OUT_DIR_FIELD, &dir));
            } else {
                warn!(dir = %dir.display(), "declaration directory does not exist, skipping");
            }
        }
        Ok(dirs)
    }

    /// Config field naming `dir`, for error messages.
    pub fn dir_field(&self, dir: &Path) -> &'static str {
        if self.out_dir_abs().as_deref() != Some(dir)
            && self.declaration_dir_abs().as_deref() == Some(dir)
        {
            DECLARATION_DIR_FIELD
        } else {
            OUT_DIR_FIELD
        }
    }

    /// Extension glob of files to rewrite.
    pub fn input_glob(&self) -> &str {
        self.file_extensions
            .input_glob
            .as_deref()
            .unwrap_or(DEFAULT_INPUT_GLOB)
    }

    fn resolve_from_config(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            absolutize(path)
        } else {
            absolutize(&self.config_dir.join(path))
        }
    }
}
