//! Project configuration for the CLI.
//!
//! A run is configured from three places:
//!
//! - the tsconfig (`compilerOptions` plus the `"tsalias"` section), see
//!   [`tsconfig`]
//! - `TSALIAS_*` environment variables
//! - command-line flags
//!
//! [`load_project`] merges them into the engine's [`ProjectConfig`].

mod loading;
pub mod tsconfig;
mod validation;


use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tsalias_core::{FileExtensions, ProjectConfig, ReplacerOptions};

use crate::cli::Cli;
use crate::error::Result;

pub use tsconfig::{TsConfig, load_tsconfig, resolve_extends, strip_jsonc};

/// Prefix of environment variables that override tool settings.
pub const ENV_PREFIX: &str = "TSALIAS_";

/// Tool settings: the `"tsalias"` section of a tsconfig, overridable from
/// the environment and the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub replacers: ReplacerOptions,
    pub resolve_full_paths: bool,
    pub verbose: bool,
    pub file_extensions: FileExtensions,
}

/// Everything loaded for one run.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub tsconfig: TsConfig,
    pub settings: Settings,
    pub config: ProjectConfig,
}

impl LoadedProject {
    /// The tsconfig file to watch for changes.
    pub fn config_file(&self) -> &Path {
        &self.tsconfig.file
    }
}

/// Load the project named by `cli`, relative to the working directory.
pub fn load_project(cli: &Cli) -> Result<LoadedProject> {
    let cwd = std::env::current_dir()?;
    load_project_in(cli, &cwd)
}

/// Load the project named by `cli`, resolving `--project` against `cwd`.
pub fn load_project_in(cli: &Cli, cwd: &Path) -> Result<LoadedProject> {
    let project = if cli.project.is_absolute() {
        cli.project.clone()
    } else {
        cwd.join(&cli.project)
    };

    let tsconfig = load_tsconfig(&project)?;
    let settings = Settings::load(tsconfig.tool.as_ref(), cli)?;
    settings.validate()?;

    let config_dir = tsconfig.config_dir().to_path_buf();
    let mut replacers = settings.replacers.clone();
    for option in replacers.values_mut() {
        if let Some(file) = option.file.as_mut() {
            *file = resolve_from(&config_dir, Path::new(file))
                .to_string_lossy()
                .into_owned();
        }
    }

    let config = ProjectConfig {
        config_file: Some(tsconfig.file.clone()),
        config_dir,
        base_url: tsconfig
            .base_url
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default(),
        out_dir: cli.out_dir.clone().or_else(|| tsconfig.out_dir.clone()),
        declaration_dir: cli
            .declaration_dir
            .clone()
            .or_else(|| tsconfig.declaration_dir.clone()),
        paths: tsconfig.paths.clone().unwrap_or_default(),
        replacers,
        resolve_full_paths: settings.resolve_full_paths,
        file_extensions: settings.file_extensions.clone(),
        watch: cli.watch,
    };
    config.validate()?;

    debug!(
        config = %tsconfig.file.display(),
        out_dir = ?config.out_dir,
        aliases = config.paths.len(),
        "loaded project"
    );

    Ok(LoadedProject {
        tsconfig,
        settings,
        config,
    })
}

fn resolve_from(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        tsalias_core::paths::absolutize(&dir.join(path))
    }
}
