//! # tsalias-core
//!
//! Rewrites tsconfig `paths` aliases in compiled JavaScript and declaration
//! output into relative paths, so the emitted modules load without a
//! resolver that knows about the aliases.
//!
//! ## Pipeline
//!
//! 1. [`ProjectConfig`] (already flattened from tsconfig) is turned into a
//!    [`ProjectLayout`] and an alias trie, with every candidate given the
//!    output directory it resolves against.
//! 2. The [`scanner`] finds import statements in each output file.
//! 3. The loaded [`Replacer`]s rewrite each statement in order.
//! 4. Optionally, relative imports get their real file extension appended.
//!
//! ## Example
//!
//! ```no_run
//! use tsalias_core::{ProjectConfig, rewrite_project};
//!
//! # async fn run() -> tsalias_core::Result<()> {
//! let config = ProjectConfig::new("/work/app")
//!     .with_base_url(".")
//!     .with_out_dir("dist")
//!     .with_alias("@app/*", ["src/app/*"]);
//!
//! let summary = rewrite_project(&config).await?;
//! println!("{} files changed", summary.changed);
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod config;
pub mod error;
pub mod full_path;
pub mod layout;
pub mod path_cache;
pub mod paths;
pub mod replacer;
pub mod rewrite;
pub mod scanner;
pub mod trie;

pub use alias::{AliasPath, AliasRecord, AliasTrie, build_alias_trie};
pub use config::{FileExtensions, PathAliases, ProjectConfig, ReplacerOption, ReplacerOptions};
pub use error::{ReplacerLoadError, Result, RewriteError};
pub use layout::ProjectLayout;
pub use path_cache::PathCache;
pub use replacer::{
    AliasReplacer, BaseUrlReplacer, FnReplacer, ReplaceContext, Replacer, ReplacerRegistry,
};
pub use rewrite::{AliasRewriter, DEFAULT_CONCURRENCY, RunSummary, rewrite_project, rewrite_project_with};
pub use trie::Trie;
