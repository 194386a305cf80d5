//! tsalias CLI - rewrite tsconfig path aliases in compiled output.
//!
//! This crate is the command-line front end of [`tsalias_core`]: it loads
//! tsconfig files, merges settings, sets up logging and terminal output, and
//! runs the rewriter once or in watch mode.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - tsconfig loading and settings merging
//! - [`commands`] - one-shot run and watch mode
//! - [`watch`] - file watcher
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing setup
//! - [`ui`] - colored status lines
//!
//! # Example
//!
//! Running the CLI with an extra replacer registered:
//!
//! ```rust,no_run
//! use tsalias_cli::{cli::Cli, commands, config};
//! use tsalias_core::{FnReplacer, ReplaceContext, ReplacerRegistry};
//!
//! # async fn run() -> tsalias_cli::Result<()> {
//! let cli = Cli {
//!     replacers: vec!["upper".to_string()],
//!     ..Cli::default()
//! };
//!
//! let mut registry = ReplacerRegistry::new();
//! registry.register_replacer(std::sync::Arc::new(FnReplacer::new(
//!     "upper",
//!     |statement: &str, _ctx: &ReplaceContext<'_>| Ok(statement.to_string()),
//! )));
//!
//! let loaded = config::load_project(&cli)?;
//! commands::execute(&cli, loaded, &registry).await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{CliError, ConfigError, Result};
