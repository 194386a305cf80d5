//! Make relative imports carry their real file extension.
//!
//! Native ESM loaders do not guess extensions, so `./utils` has to become
//! `./utils.js` (or `./utils/index.js`). Only relative specifiers are
//! touched; package imports are left to the loader.

use std::path::Path;

use tracing::trace;

use crate::error::{Result, RewriteError};
use crate::path_cache::PathCache;
use crate::paths::is_relative_specifier;
use crate::scanner::{extract_specifier, replace_import_statements, replace_specifier};

/// Resolve every extensionless relative import in `source` against the
/// directory of `file`.
pub fn resolve_full_paths(source: &str, file: &Path, cache: &PathCache) -> Result<String> {
    let dir = file.parent().unwrap_or(Path::new(""));
    replace_import_statements(source, |statement| {
        let specifier = extract_specifier(statement).ok_or_else(|| RewriteError::MalformedStatement {
            file: file.to_path_buf(),
            statement: statement.to_string(),
        })?;

        match full_specifier(dir, specifier, cache) {
            Some(resolved) => {
                trace!(specifier, resolved = %resolved, "resolved full path");
                Ok(replace_specifier(statement, &resolved).unwrap_or_else(|| statement.to_string()))
            }
            None => Ok(statement.to_string()),
        }
    })
}

/// The specifier with the extension of the file it points to, if any.
///
/// `<specifier>.<ext>` is tried for each output extension in order, then
/// `<specifier>/index.<ext>`.
pub fn full_specifier(dir: &Path, specifier: &str, cache: &PathCache) -> Option<String> {
    if !is_relative_specifier(specifier) || has_known_extension(specifier, cache.extensions()) {
        return None;
    }

    let trimmed = specifier.trim_end_matches('/');
    let directory_only = trimmed == "." || trimmed == ".." || trimmed.len() != specifier.len();

    if !directory_only {
        for ext in cache.extensions() {
            let candidate = format!("{trimmed}.{ext}");
            if cache.is_file(&dir.join(&candidate)) {
                return Some(candidate);
            }
        }
    }

    cache.extensions().iter().find_map(|ext| {
        let candidate = format!("{trimmed}/index.{ext}");
        cache.is_file(&dir.join(&candidate)).then_some(candidate)
    })
}

fn has_known_extension(specifier: &str, extensions: &[String]) -> bool {
    let Some(name) = specifier.rsplit('/').next() else {
        return false;
    };
    extensions.iter().any(|ext| {
        name.len() > ext.len() + 1
            && name.ends_with(ext.as_str())
            && name[..name.len() - ext.len()].ends_with('.')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    #[test]
    fn test_appends_file_extension() {
        let temp = project(&["utils.js", "data.json", "lib/index.mjs"]);
        let cache = PathCache::new(true, None);
        let dir = temp.path();

        assert_eq!(full_specifier(dir, "./utils", &cache).as_deref(), Some("./utils.js"));
        assert_eq!(full_specifier(dir, "./data", &cache).as_deref(), Some("./data.json"));
        assert_eq!(full_specifier(dir, "./lib", &cache).as_deref(), Some("./lib/index.mjs"));
        assert_eq!(full_specifier(dir, "./lib/", &cache).as_deref(), Some("./lib/index.mjs"));
    }

    #[test]
    fn test_leaves_explicit_and_package_specifiers() {
        let temp = project(&["utils.js", "utils.js.js"]);
        let cache = PathCache::new(true, None);
        let dir = temp.path();

        assert_eq!(full_specifier(dir, "./utils.js", &cache), None);
        assert_eq!(full_specifier(dir, "react", &cache), None);
        assert_eq!(full_specifier(dir, "./missing", &cache), None);
    }

    #[test]
    fn test_parent_directory_index() {
        let temp = project(&["index.js", "nested/a.js"]);
        let cache = PathCache::new(true, None);

        assert_eq!(
            full_specifier(&temp.path().join("nested"), "..", &cache).as_deref(),
            Some("../index.js")
        );
    }

    #[test]
    fn test_rewrites_source() {
        let temp = project(&["dist/a.js", "dist/b.js", "dist/c/index.js"]);
        let cache = PathCache::new(true, None);
        let source = "import a from './a';\nexport * from './c';\nconst b = require(\"./b.js\");\nimport 'react';\n";

        let out = resolve_full_paths(source, &temp.path().join("dist/main.js"), &cache).unwrap();
        assert_eq!(
            out,
            "import a from './a.js';\nexport * from './c/index.js';\nconst b = require(\"./b.js\");\nimport 'react';\n"
        );
    }

    #[test]
    fn test_known_extension_check() {
        let exts = vec!["js".to_string(), "d.ts".to_string()];
        assert!(has_known_extension("./a.js", &exts));
        assert!(has_known_extension("./types.d.ts", &exts));
        assert!(!has_known_extension("./a", &exts));
        assert!(!has_known_extension("./.js", &exts));
        assert!(!has_known_extension("./a.mjs", &exts));
    }
}
