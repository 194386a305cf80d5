//! Alias records and the trie they are served from.
//!
//! Every `paths` entry of the project configuration becomes one
//! [`AliasRecord`]. Its candidates are normalized (source extensions mapped
//! to output extensions, absolute paths made relative to the base URL) and
//! each one is given the directory it resolves against in the output tree.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use path_clean::PathClean;
use regex::Regex;
use tracing::debug;

use crate::config::PathAliases;
use crate::layout::ProjectLayout;
use crate::path_cache::PathCache;
use crate::paths::{has_parent_segment, relative_path, to_posix};
use crate::trie::Trie;

/// Trie of alias records keyed by prefix.
pub type AliasTrie = Trie<AliasRecord>;

static DECLARATION_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.d(\..*)?\.[mc]?ts(x)?$").expect("valid regex"));

static SOURCE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([mc])?ts(x)?$").expect("valid regex"));

/// One declared alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    /// Alias text with the trailing `*` removed; never empty
    pub prefix: String,
    /// The alias ended in `*`
    pub matches_wildly: bool,
    /// Tried in declaration order
    pub candidates: Vec<AliasPath>,
}

impl AliasRecord {
    /// Whether `specifier` really belongs to this alias.
    ///
    /// A trie lookup only returns the record with the longest stored prefix,
    /// which for a plain alias `b` also comes back for `banana`.
    pub fn matches(&self, specifier: &str) -> bool {
        if self.matches_wildly {
            specifier.starts_with(&self.prefix) && specifier != self.prefix
        } else {
            specifier == self.prefix
                || specifier
                    .strip_prefix(&self.prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    }
}

/// One candidate target of an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasPath {
    /// Absolute directory the candidate resolves against
    pub base_path: PathBuf,
    /// Fragment appended to `base_path`; empty for extra candidates
    pub relative_path: String,
    /// Lives outside the output tree and was resolved directly
    pub is_extra: bool,
}

/// Whether `path` ends in a declaration-file extension (`.d.ts`, `.d.json.ts`, ...).
pub fn is_declaration_file(path: &str) -> bool {
    DECLARATION_EXTENSION.is_match(path)
}

/// Normalize one candidate as written in `paths`.
///
/// One trailing `*` is dropped. A source extension (`.ts`, `.tsx`, `.mts`,
/// `.cts`) becomes its output counterpart unless the path is a declaration
/// file or the last dot belongs to a directory name. Absolute candidates are
/// made relative to `base_url_dir`.
pub fn normalize_candidate(candidate: &str, base_url_dir: &Path) -> String {
    let mut path = candidate.strip_suffix('*').unwrap_or(candidate).to_string();

    if let Some(dot) = path.rfind('.') {
        let extension = &path[dot..];
        if !extension.contains(['/', '\\']) && !is_declaration_file(&path) {
            path = SOURCE_EXTENSION.replace(&path, ".${1}js${2}").into_owned();
        }
    }

    if Path::new(&path).is_absolute() {
        path = to_posix(&relative_path(base_url_dir, &Path::new(&path).clean()));
    }

    path
}

fn is_node_modules_candidate(path: &str) -> bool {
    let path = path.strip_prefix("./").unwrap_or(path);
    path == "node_modules" || path.starts_with("node_modules/")
}

/// Decide the base directory of one normalized candidate.
pub fn resolve_candidate(candidate: String, layout: &ProjectLayout, cache: &PathCache) -> AliasPath {
    if has_parent_segment(&candidate) {
        let base = layout.out_base_dir();
        let target = base.join(&candidate).clean();
        return if cache.exists(&target) {
            AliasPath {
                base_path: base,
                relative_path: candidate,
                is_extra: false,
            }
        } else {
            AliasPath {
                base_path: target,
                relative_path: String::new(),
                is_extra: true,
            }
        };
    }

    // The compiler never copies node_modules into the output tree
    if is_node_modules_candidate(&candidate) {
        let rest = candidate
            .trim_start_matches("./")
            .trim_start_matches("node_modules")
            .trim_start_matches('/')
            .to_string();
        return AliasPath {
            base_path: layout.base_url_dir().join("node_modules"),
            relative_path: rest,
            is_extra: false,
        };
    }

    let base_path = if layout.has_extra_module() {
        layout.out_base_dir()
    } else {
        layout.out_dir().to_path_buf()
    };
    AliasPath {
        base_path,
        relative_path: candidate,
        is_extra: false,
    }
}

/// Build the alias trie for one run.
///
/// Nested-output detection only runs when some candidate climbs out of the
/// project with `..`; it has to finish before any base path is decided.
pub fn build_alias_trie(paths: &PathAliases, layout: &ProjectLayout, cache: &PathCache) -> AliasTrie {
    let base_url_dir = layout.base_url_dir();
    let normalized: Vec<(&str, Vec<String>)> = paths
        .iter()
        .map(|(alias, candidates)| {
            let candidates = candidates
                .iter()
                .map(|candidate| normalize_candidate(candidate, &base_url_dir))
                .collect();
            (alias.as_str(), candidates)
        })
        .collect();

    if normalized
        .iter()
        .any(|(_, candidates)| candidates.iter().any(|c| has_parent_segment(c)))
    {
        layout.detect_nesting();
    }

    let mut trie = AliasTrie::new();
    for (alias, candidates) in normalized {
        let matches_wildly = alias.ends_with('*');
        let prefix = alias.strip_suffix('*').unwrap_or(alias);
        if prefix.is_empty() {
            debug!(alias, "skipping alias with empty prefix");
            continue;
        }

        let candidates: Vec<AliasPath> = candidates
            .into_iter()
            .map(|candidate| resolve_candidate(candidate, layout, cache))
            .collect();
        debug!(prefix, candidates = candidates.len(), "registered alias");

        trie.add(
            prefix,
            AliasRecord {
                prefix: prefix.to_string(),
                matches_wildly,
                candidates,
            },
        );
    }
    trie
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(prefix: &str, matches_wildly: bool) -> AliasRecord {
        AliasRecord {
            prefix: prefix.to_string(),
            matches_wildly,
            candidates: Vec::new(),
        }
    }

    #[test]
    fn test_plain_alias_matching() {
        let alias = record("b", false);
        assert!(alias.matches("b"));
        assert!(alias.matches("b/c"));
        assert!(!alias.matches("banana"));
    }

    #[test]
    fn test_wildcard_alias_matching() {
        let alias = record("@app/", true);
        assert!(alias.matches("@app/button"));
        assert!(!alias.matches("@app/"));
        assert!(!alias.matches("@application"));

        let alias = record("~", true);
        assert!(alias.matches("~utils"));
        assert!(!alias.matches("~"));
    }

    #[test]
    fn test_normalize_candidate_extensions() {
        let base = Path::new("/project");
        assert_eq!(normalize_candidate("src/app/*", base), "src/app/");
        assert_eq!(normalize_candidate("src/index.ts", base), "src/index.js");
        assert_eq!(normalize_candidate("src/view.tsx", base), "src/view.jsx");
        assert_eq!(normalize_candidate("src/esm.mts", base), "src/esm.mjs");
        assert_eq!(normalize_candidate("src/cjs.cts", base), "src/cjs.cjs");
        assert_eq!(normalize_candidate("types/global.d.ts", base), "types/global.d.ts");
        assert_eq!(normalize_candidate("lib.v2/src", base), "lib.v2/src");
        assert_eq!(normalize_candidate("src", base), "src");
    }

    #[test]
    fn test_normalize_absolute_candidate() {
        assert_eq!(
            normalize_candidate("/project/src/shared/*", Path::new("/project")),
            "src/shared/"
        );
    }

    #[test]
    fn test_build_skips_empty_prefix() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path(), temp.path().join("dist"), ".");
        let cache = PathCache::new(true, None);

        let mut paths = PathAliases::new();
        paths.insert("*".to_string(), vec!["src/*".to_string()]);
        paths.insert("@app/*".to_string(), vec!["src/app/*".to_string()]);

        let trie = build_alias_trie(&paths, &layout, &cache);
        assert_eq!(trie.len(), 1);

        let app = trie.search("@app/button").unwrap();
        assert!(app.matches_wildly);
        assert_eq!(app.candidates[0].base_path, temp.path().join("dist"));
        assert_eq!(app.candidates[0].relative_path, "src/app/");
        assert!(!app.candidates[0].is_extra);
    }

    #[test]
    fn test_node_modules_candidate_resolves_against_base_url() {
        let layout = ProjectLayout::new("/project", "/project/dist", ".");
        let cache = PathCache::new(false, None);

        let path = resolve_candidate("./node_modules/pkg/lib".to_string(), &layout, &cache);
        assert_eq!(path.base_path, PathBuf::from("/project/node_modules"));
        assert_eq!(path.relative_path, "pkg/lib");
        assert!(!path.is_extra);
    }

    #[test]
    fn test_parent_candidate_extra_or_not() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let project = root.join("app");
        fs::create_dir_all(project.join("dist/app/src")).unwrap();
        fs::create_dir_all(project.join("dist/shared/src")).unwrap();

        let layout = ProjectLayout::new(&project, project.join("dist"), ".");
        let cache = PathCache::new(true, None);

        let mut paths = PathAliases::new();
        paths.insert("@shared/*".to_string(), vec!["../shared/src/*".to_string()]);
        paths.insert("@lost/*".to_string(), vec!["../lost/*".to_string()]);
        paths.insert("@/*".to_string(), vec!["src/*".to_string()]);

        let trie = build_alias_trie(&paths, &layout, &cache);
        assert_eq!(layout.nested_offset(), Some(Path::new("app")));

        let shared = &trie.search("@shared/x").unwrap().candidates[0];
        assert!(!shared.is_extra);
        assert_eq!(shared.base_path, project.join("dist/app"));
        assert_eq!(shared.relative_path, "../shared/src/");

        let lost = &trie.search("@lost/x").unwrap().candidates[0];
        assert!(lost.is_extra);
        assert_eq!(lost.base_path, project.join("dist/lost"));
        assert_eq!(lost.relative_path, "");

        let own = &trie.search("@/x").unwrap().candidates[0];
        assert!(!own.is_extra);
        assert_eq!(own.base_path, project.join("dist/app"));
    }
}
