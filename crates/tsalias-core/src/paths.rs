//! Path helpers shared by the resolver and the replacers.
//!
//! Filesystem paths stay `Path`/`PathBuf`; import specifiers are always
//! POSIX-style strings, whatever the host separator is.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Make `path` absolute against the current directory and lexically clean it.
///
/// Falls back to the cleaned input if the current directory is unavailable.
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .clean()
}

/// Relative path from directory `from` to `to`.
///
/// Both paths are expected to be absolute and clean. The result uses `..`
/// components to climb out of `from`; it is empty when both are equal.
/// `to` is returned as-is if no relative path exists between the two.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    pathdiff::diff_paths(to, from).unwrap_or_else(|| to.to_path_buf())
}

/// Render a path with forward slashes.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a specifier the way module loaders expect to see it.
///
/// Backslashes become slashes, runs of slashes collapse to one and a trailing
/// slash is dropped. Leading `./` and `../` segments are preserved.
pub fn normalize_specifier(specifier: &str) -> String {
    let mut out = String::with_capacity(specifier.len());
    let mut last_was_slash = false;
    for ch in specifier.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Force a relative specifier to start with `./` or `../`.
///
/// Node-style loaders treat anything else as a package lookup.
pub fn ensure_dot_prefix(relative: &str) -> String {
    if relative.is_empty() {
        return ".".to_string();
    }
    if relative == "."
        || relative == ".."
        || relative.starts_with("./")
        || relative.starts_with("../")
    {
        relative.to_string()
    } else {
        format!("./{relative}")
    }
}

/// Specifier pointing from `importer`'s directory to `target`.
///
/// `importer` is a file; `target` an absolute directory or extensionless module path.
pub fn relative_specifier(importer: &Path, target: &Path) -> String {
    let dir = importer.parent().unwrap_or(Path::new(""));
    let relative = relative_path(dir, target);
    ensure_dot_prefix(&normalize_specifier(&to_posix(&relative)))
}

/// Whether a specifier is relative (`.`, `..`, `./x`, `../x`).
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Whether a candidate path escapes its base directory with a `..` segment.
pub fn has_parent_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}
