//! Memoized filesystem probes used while resolving aliases.
//!
//! Two lookups dominate a run: "does this module exist" and "where does this
//! alias candidate actually live". Both are pure functions of the filesystem,
//! so within one invocation their results are cached per exact input. Watch
//! mode disables the cache because files appear and disappear between events.
//!
//! The maps are `DashMap`s so concurrent file tasks can fill them without a
//! global lock. Two tasks racing on the same key both compute the same value,
//! so whichever insert lands last is fine.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use path_clean::PathClean;

/// Output extensions probed by [`PathCache::exists`] when none are configured.
pub const DEFAULT_OUTPUT_EXTENSIONS: &[&str] = &[
    "js", "json", "jsx", "cjs", "mjs", "d.ts", "d.tsx", "d.cts", "d.mts",
];

#[derive(Debug)]
pub struct PathCache {
    enabled: bool,
    extensions: Vec<String>,
    exists_cache: DashMap<PathBuf, bool>,
    file_cache: DashMap<PathBuf, bool>,
    resolve_cache: DashMap<(PathBuf, String), PathBuf>,
}

impl PathCache {
    /// Create a cache. `extensions` overrides [`DEFAULT_OUTPUT_EXTENSIONS`]
    /// (given without the leading dot).
    pub fn new(enabled: bool, extensions: Option<Vec<String>>) -> Self {
        let extensions = extensions
            .filter(|exts| !exts.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_OUTPUT_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect()
            })
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();

        Self {
            enabled,
            extensions,
            exists_cache: DashMap::new(),
            file_cache: DashMap::new(),
            resolve_cache: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Output extensions probed by [`exists`](Self::exists), without dots.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `path` exists verbatim or with one of the output extensions appended.
    pub fn exists(&self, path: &Path) -> bool {
        if !self.enabled {
            return self.probe(path);
        }
        if let Some(hit) = self.exists_cache.get(path) {
            return *hit;
        }
        let result = self.probe(path);
        self.exists_cache.insert(path.to_path_buf(), result);
        result
    }

    /// Whether `path` is an existing regular file, with no extension probing.
    pub fn is_file(&self, path: &Path) -> bool {
        if !self.enabled {
            return path.is_file();
        }
        if let Some(hit) = self.file_cache.get(path) {
            return *hit;
        }
        let result = path.is_file();
        self.file_cache.insert(path.to_path_buf(), result);
        result
    }

    /// Absolute location of an alias candidate.
    ///
    /// Leading segments of `relative` are dropped until `base/segment` exists,
    /// then the remaining segments are joined verbatim. This lets a candidate
    /// like `src/app` land on `dist/app` when the compiler flattened `src` away.
    /// When no segment exists the result is `base` itself.
    pub fn resolve(&self, base: &Path, relative: &str) -> PathBuf {
        if !self.enabled {
            return self.resolve_uncached(base, relative);
        }
        let key = (base.to_path_buf(), relative.to_string());
        if let Some(hit) = self.resolve_cache.get(&key) {
            return hit.clone();
        }
        let result = self.resolve_uncached(base, relative);
        self.resolve_cache.insert(key, result.clone());
        result
    }

    /// Drop every memoized result.
    pub fn clear(&self) {
        self.exists_cache.clear();
        self.file_cache.clear();
        self.resolve_cache.clear();
    }

    fn resolve_uncached(&self, base: &Path, relative: &str) -> PathBuf {
        let mut parts = relative
            .split('/')
            .filter(|part| !(part.trim().is_empty() || *part == "."));

        let mut current = parts.next().unwrap_or("");
        let mut found = self.probe(&base.join(current));
        while !found {
            match parts.next() {
                Some(next) => {
                    current = next;
                    found = self.probe(&base.join(current));
                }
                None => break,
            }
        }

        let mut resolved = base.to_path_buf();
        if found && !current.is_empty() {
            resolved.push(current);
        }
        for rest in parts {
            resolved.push(rest);
        }
        resolved.clean()
    }

    fn probe(&self, path: &Path) -> bool {
        if path.exists() {
            return true;
        }
        let raw = path.as_os_str().to_string_lossy();
        self.extensions
            .iter()
            .any(|ext| Path::new(&format!("{raw}.{ext}")).exists())
    }
}
