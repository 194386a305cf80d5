//! Replacer pipeline.
//!
//! A [`Replacer`] rewrites one import statement at a time. The rewriter runs
//! every loaded replacer over every statement in pipeline order, so later
//! replacers see what earlier ones produced. A replacer that does not
//! recognize a statement returns it unchanged.
//!
//! Replacers are looked up by name in a [`ReplacerRegistry`]. The built-in
//! `default` (alias) and `baseUrl` replacers are always registered and enabled
//! unless configuration turns them off; embedders register their own
//! factories and enable them through the `replacers` configuration.

mod alias;
mod base_url;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

pub use alias::AliasReplacer;
pub use base_url::BaseUrlReplacer;

use crate::alias::AliasTrie;
use crate::config::{ReplacerOption, ReplacerOptions};
use crate::error::{ReplacerLoadError, Result};
use crate::layout::ProjectLayout;
use crate::path_cache::PathCache;

/// Name of the built-in alias replacer.
pub const DEFAULT_REPLACER: &str = "default";
/// Name of the built-in base URL replacer.
pub const BASE_URL_REPLACER: &str = "baseUrl";

/// Everything a replacer may consult while rewriting one file.
#[derive(Clone, Copy)]
pub struct ReplaceContext<'a> {
    /// The file being rewritten
    pub file: &'a Path,
    pub trie: &'a AliasTrie,
    pub cache: &'a PathCache,
    pub layout: &'a ProjectLayout,
}

impl fmt::Debug for ReplaceContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaceContext")
            .field("file", &self.file)
            .field("aliases", &self.trie.len())
            .finish_non_exhaustive()
    }
}

/// Rewrites a single import statement.
pub trait Replacer: Send + Sync {
    /// Name used in configuration and log output.
    fn name(&self) -> &str;

    /// Return `statement` rewritten, or unchanged if it is not for this replacer.
    fn replace(&self, statement: &str, ctx: &ReplaceContext<'_>) -> Result<String>;
}

/// A replacer built from a closure.
pub struct FnReplacer<F> {
    name: String,
    func: F,
}

impl<F> FnReplacer<F>
where
    F: Fn(&str, &ReplaceContext<'_>) -> Result<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Replacer for FnReplacer<F>
where
    F: Fn(&str, &ReplaceContext<'_>) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn replace(&self, statement: &str, ctx: &ReplaceContext<'_>) -> Result<String> {
        (self.func)(statement, ctx)
    }
}

/// Builds a replacer from its configuration entry. An `Err` is the reason
/// the replacer could not be created.
pub type ReplacerFactory =
    Arc<dyn Fn(&ReplacerOption) -> std::result::Result<Arc<dyn Replacer>, String> + Send + Sync>;

/// Replacers instantiated for one run.
#[derive(Default)]
pub struct LoadedReplacers {
    pub replacers: Vec<Arc<dyn Replacer>>,
    pub errors: Vec<ReplacerLoadError>,
}

impl LoadedReplacers {
    pub fn names(&self) -> Vec<&str> {
        self.replacers.iter().map(|r| r.name()).collect()
    }
}

/// Named replacer factories.
#[derive(Clone)]
pub struct ReplacerRegistry {
    factories: IndexMap<String, ReplacerFactory>,
}

impl Default for ReplacerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReplacerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacerRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ReplacerRegistry {
    /// Registry holding the built-in replacers.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
        };
        registry.register_replacer(Arc::new(AliasReplacer));
        registry.register_replacer(Arc::new(BaseUrlReplacer));
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ReplacerOption) -> std::result::Result<Arc<dyn Replacer>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a ready-made replacer under its own name.
    pub fn register_replacer(&mut self, replacer: Arc<dyn Replacer>) {
        let name = replacer.name().to_string();
        self.register(name, move |_| Ok(Arc::clone(&replacer)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the enabled replacers.
    ///
    /// The built-ins come first unless `options` disables them, followed by
    /// the entries of `options` in order. Entries that cannot be loaded are
    /// collected as errors and skipped.
    pub fn load(&self, options: &ReplacerOptions) -> LoadedReplacers {
        let mut merged = ReplacerOptions::new();
        merged.insert(DEFAULT_REPLACER.to_string(), ReplacerOption::enabled());
        merged.insert(BASE_URL_REPLACER.to_string(), ReplacerOption::enabled());
        for (name, option) in options {
            merged.insert(name.clone(), option.clone());
        }

        let mut loaded = LoadedReplacers::default();
        for (name, option) in &merged {
            if !option.enabled {
                debug!(replacer = %name, "replacer disabled");
                continue;
            }

            let result = match self.factories.get(name) {
                Some(factory) => (**factory)(option),
                None => Err(match option.file.as_deref() {
                    Some(file) => format!("no replacer registered for \"{file}\""),
                    None => "no replacer registered under this name".to_string(),
                }),
            };

            match result {
                Ok(replacer) => {
                    debug!(replacer = %name, "loaded replacer");
                    loaded.replacers.push(replacer);
                }
                Err(reason) => {
                    let error = ReplacerLoadError {
                        name: name.clone(),
                        reason,
                    };
                    warn!("{error}");
                    loaded.errors.push(error);
                }
            }
        }
        loaded
    }
}
