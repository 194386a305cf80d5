//! Rewrite orchestration.
//!
//! [`AliasRewriter`] holds everything one run needs: the layout, the alias
//! trie, the path cache and the loaded replacers. It is built once, then
//! shared (`Arc`) by the per-file tasks of a batch run or by a watcher that
//! feeds it changed files one at a time.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::alias::{AliasTrie, build_alias_trie};
use crate::config::ProjectConfig;
use crate::error::{ReplacerLoadError, Result, RewriteError};
use crate::full_path::resolve_full_paths;
use crate::layout::ProjectLayout;
use crate::path_cache::PathCache;
use crate::replacer::{ReplaceContext, Replacer, ReplacerRegistry};
use crate::scanner::replace_import_statements;

/// Upper bound on files processed at once, to stay clear of open-file limits.
pub const DEFAULT_CONCURRENCY: usize = 256;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files matched by the input glob
    pub scanned: usize,
    /// Files whose content changed and was written back
    pub changed: usize,
    /// Files that could not be processed
    pub failed: Vec<(PathBuf, RewriteError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.scanned += other.scanned;
        self.changed += other.changed;
        self.failed.extend(other.failed);
    }
}

pub struct AliasRewriter {
    layout: ProjectLayout,
    trie: AliasTrie,
    cache: PathCache,
    replacers: Vec<Arc<dyn Replacer>>,
    load_errors: Vec<ReplacerLoadError>,
    input: GlobSet,
    dir_field: &'static str,
    resolve_full_paths: bool,
    concurrency: usize,
}

impl std::fmt::Debug for AliasRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasRewriter")
            .field("out_dir", &self.layout.out_dir())
            .field("aliases", &self.trie.len())
            .field("replacers", &self.replacer_names())
            .field("resolve_full_paths", &self.resolve_full_paths)
            .finish_non_exhaustive()
    }
}

impl AliasRewriter {
    /// Prepare a run with the built-in replacers.
    pub fn prepare(config: &ProjectConfig) -> Result<Self> {
        Self::prepare_with(config, &ReplacerRegistry::new())
    }

    /// Prepare a run, loading replacers from `registry`.
    ///
    /// Fails only on configuration preconditions. Replacers that cannot be
    /// loaded are reported through [`load_errors`](Self::load_errors).
    pub fn prepare_with(config: &ProjectConfig, registry: &ReplacerRegistry) -> Result<Self> {
        Self::prepare_in(config, registry, None)
    }

    /// Prepare a run over `dir` instead of the configured output directory.
    /// Used for the declaration directory pass.
    pub fn prepare_for_dir(config: &ProjectConfig, registry: &ReplacerRegistry, dir: &Path) -> Result<Self> {
        Self::prepare_in(config, registry, Some(dir))
    }

    fn prepare_in(
        config: &ProjectConfig,
        registry: &ReplacerRegistry,
        out_dir: Option<&Path>,
    ) -> Result<Self> {
        config.validate()?;

        let layout = ProjectLayout::from_config(config, out_dir)?;
        let cache = PathCache::new(!config.watch, config.file_extensions.output_check.clone());
        let trie = build_alias_trie(&config.paths, &layout, &cache);
        let loaded = registry.load(&config.replacers);
        let input = input_globset(config.input_glob())?;
        let dir_field = config.dir_field(layout.out_dir());

        debug!(
            out_dir = %layout.out_dir().display(),
            aliases = trie.len(),
            replacers = ?loaded.names(),
            "prepared rewriter"
        );

        Ok(Self {
            layout,
            trie,
            cache,
            replacers: loaded.replacers,
            load_errors: loaded.errors,
            input,
            dir_field,
            resolve_full_paths: config.resolve_full_paths,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Limit the number of files processed at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn out_dir(&self) -> &Path {
        self.layout.out_dir()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn trie(&self) -> &AliasTrie {
        &self.trie
    }

    pub fn replacer_names(&self) -> Vec<&str> {
        self.replacers.iter().map(|r| r.name()).collect()
    }

    pub fn load_errors(&self) -> &[ReplacerLoadError] {
        &self.load_errors
    }

    /// Forget memoized filesystem probes.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Rewrite an in-memory copy of `file`. Only the path cache touches the disk.
    pub fn rewrite_source(&self, file: &Path, code: &str) -> Result<String> {
        let ctx = ReplaceContext {
            file,
            trie: &self.trie,
            cache: &self.cache,
            layout: &self.layout,
        };

        let mut code = code.to_string();
        for replacer in &self.replacers {
            code = replace_import_statements(&code, |statement| replacer.replace(statement, &ctx))?;
        }
        if self.resolve_full_paths {
            code = resolve_full_paths(&code, file, &self.cache)?;
        }
        Ok(code)
    }

    /// Rewrite one file in place. Returns whether its content changed.
    pub async fn rewrite_file(&self, file: &Path) -> Result<bool> {
        let code = tokio::fs::read_to_string(file)
            .await
            .map_err(|e| RewriteError::io(file, e))?;
        let rewritten = self.rewrite_source(file, &code)?;
        if rewritten == code {
            return Ok(false);
        }

        tokio::fs::write(file, rewritten)
            .await
            .map_err(|e| RewriteError::io(file, e))?;
        debug!(file = %file.display(), "rewrote imports");
        Ok(true)
    }

    /// Whether `path` is a file this rewriter should process.
    pub fn is_input(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(self.layout.out_dir()) else {
            return false;
        };
        let in_node_modules = relative
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"));
        !in_node_modules && self.input.is_match(relative)
    }

    /// Every input file under the output directory, sorted.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let out_dir = self.layout.out_dir();
        let mut files = Vec::new();
        let walker = WalkDir::new(out_dir)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != "node_modules");

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_input(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Rewrite every input file under the output directory.
    ///
    /// A file that fails is recorded in the summary; the others still run.
    pub async fn rewrite_all(self: &Arc<Self>) -> Result<RunSummary> {
        let out_dir = self.layout.out_dir();
        if !out_dir.is_dir() {
            return Err(RewriteError::missing_dir(self.dir_field, out_dir));
        }

        let files = self.collect_files()?;
        let mut summary = RunSummary {
            scanned: files.len(),
            ..RunSummary::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        for file in files {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let rewriter = Arc::clone(self);
            join_set.spawn(async move {
                let _permit = permit;
                let result = rewriter.rewrite_file(&file).await;
                (file, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(true))) => summary.changed += 1,
                Ok((_, Ok(false))) => {}
                Ok((file, Err(err))) => {
                    error!(file = %file.display(), "{err}");
                    summary.failed.push((file, err));
                }
                Err(join_err) => {
                    error!("rewrite task failed: {join_err}");
                    summary
                        .failed
                        .push((PathBuf::new(), RewriteError::Task(join_err.to_string())));
                }
            }
        }

        Ok(summary)
    }
}

/// Compile the input glob. `glob` is the extension part, e.g. `{js,mjs}`;
/// nested braces are expanded since globset does not nest alternations.
pub fn input_globset(glob: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in expand_braces(&format!("**/*.{glob}")) {
        builder.add(Glob::new(&pattern)?);
    }
    Ok(builder.build()?)
}

fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, ch) in pattern[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(open + i),
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| expand_braces(&format!("{prefix}{}{suffix}", &pattern[w[0] + 1..w[1]])))
        .collect()
}

/// Rewrite a whole project with the built-in replacers.
pub async fn rewrite_project(config: &ProjectConfig) -> Result<RunSummary> {
    rewrite_project_with(config, &ReplacerRegistry::new()).await
}

/// Rewrite a whole project: the output directory, then the declaration
/// directory when it is set and different.
///
/// Every directory is checked before the first file is read.
pub async fn rewrite_project_with(config: &ProjectConfig, registry: &ReplacerRegistry) -> Result<RunSummary> {
    let dirs = config.existing_output_dirs()?;

    let mut summary = RunSummary::default();
    for dir in dirs {
        debug!(dir = %dir.display(), "rewriting directory");
        let rewriter = Arc::new(AliasRewriter::prepare_for_dir(config, registry, &dir)?);
        summary.merge(rewriter.rewrite_all().await?);
    }

    info!(
        changed = summary.changed,
        scanned = summary.scanned,
        "{} files were affected",
        summary.changed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("*.js"), vec!["*.js"]);
        assert_eq!(expand_braces("*.{js,mjs}"), vec!["*.js", "*.mjs"]);
        assert_eq!(
            expand_braces("*.{js,d.{ts,mts}}"),
            vec!["*.js", "*.d.ts", "*.d.mts"]
        );
    }

    #[test]
    fn test_input_globset_matches_nested_files() {
        let set = input_globset(crate::config::DEFAULT_INPUT_GLOB).unwrap();
        assert!(set.is_match("index.js"));
        assert!(set.is_match("pages/home.mjs"));
        assert!(set.is_match("types/global.d.ts"));
        assert!(!set.is_match("styles/site.css"));
        assert!(!set.is_match("index.ts"));

        let set = input_globset("{js,d.{ts,mts}}").unwrap();
        assert!(set.is_match("a/b.d.mts"));
        assert!(!set.is_match("a/b.cjs"));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = input_globset("{js").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_summary_merge() {
        let mut a = RunSummary {
            scanned: 2,
            changed: 1,
            failed: Vec::new(),
        };
        a.merge(RunSummary {
            scanned: 3,
            changed: 2,
            failed: vec![(PathBuf::from("x.js"), RewriteError::Task("boom".into()))],
        });
        assert_eq!((a.scanned, a.changed, a.failed.len()), (5, 3, 1));
        assert!(!a.is_success());
    }
}
