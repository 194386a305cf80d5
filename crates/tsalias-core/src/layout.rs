//! Run-scoped facts about where the compiler put things.
//!
//! When a project references a sibling project through `../`, the compiler
//! widens its root directory and re-creates the referencing project's own
//! directory inside the output tree (`dist/app/src/...` instead of
//! `dist/src/...`). Aliases that stay inside the project must then be
//! re-anchored one or more levels deeper. [`ProjectLayout`] finds that extra
//! nesting once, the first time an alias needs it, and remembers the answer
//! for the rest of the run.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use path_clean::PathClean;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{OUT_DIR_FIELD, ProjectConfig};
use crate::error::{Result, RewriteError};
use crate::paths::{relative_path, to_posix};

#[derive(Debug)]
pub struct ProjectLayout {
    config_dir: PathBuf,
    out_dir: PathBuf,
    base_url: String,
    nesting: OnceLock<Option<PathBuf>>,
}

impl ProjectLayout {
    /// `config_dir` and `out_dir` must be absolute. An absolute `base_url`
    /// is stored relative to `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, base_url: &str) -> Self {
        let config_dir = config_dir.into().clean();
        let base_url = if Path::new(base_url).is_absolute() {
            to_posix(&relative_path(&config_dir, &Path::new(base_url).clean()))
        } else {
            base_url.to_string()
        };

        Self {
            config_dir,
            out_dir: out_dir.into().clean(),
            base_url,
            nesting: OnceLock::new(),
        }
    }

    /// Layout for `config`, rooted at `out_dir` when given (declaration pass)
    /// or at the configured output directory.
    pub fn from_config(config: &ProjectConfig, out_dir: Option<&Path>) -> Result<Self> {
        let out_dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => config.out_dir_abs().ok_or_else(|| RewriteError::MissingField {
                field: OUT_DIR_FIELD.to_string(),
                hint: "Set outDir in tsconfig.json or pass --dir <dir>".to_string(),
            })?,
        };
        Ok(Self::new(config.config_dir_abs(), out_dir, &config.base_url))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `configDir/baseUrl`, where source-level non-relative imports resolve.
    pub fn base_url_dir(&self) -> PathBuf {
        self.config_dir.join(&self.base_url).clean()
    }

    /// Name of the project directory, as it would reappear inside the output.
    pub fn project_dir_name(&self) -> Option<&OsStr> {
        self.config_dir.file_name()
    }

    /// Detect the nested copy of the project inside the output tree.
    ///
    /// Walks the output directory on the first call only; later calls return
    /// the remembered offset.
    pub fn detect_nesting(&self) -> Option<&Path> {
        self.nesting
            .get_or_init(|| {
                let name = self.project_dir_name()?;
                let offset = find_nested_project_dir(&self.out_dir, name)?;
                debug!(
                    out_dir = %self.out_dir.display(),
                    offset = %offset.display(),
                    "found nested project directory in output"
                );
                Some(offset)
            })
            .as_deref()
    }

    /// The nested offset, if detection has already run and found one.
    pub fn nested_offset(&self) -> Option<&Path> {
        self.nesting.get().and_then(|offset| offset.as_deref())
    }

    pub fn has_extra_module(&self) -> bool {
        self.nested_offset().is_some()
    }

    /// `outDir/[nestedOffset]/baseUrl`, the output-side mirror of the base URL.
    pub fn out_base_dir(&self) -> PathBuf {
        let mut dir = self.out_dir.clone();
        if let Some(offset) = self.nested_offset() {
            dir.push(offset);
        }
        dir.join(&self.base_url).clean()
    }
}

/// Find the directory named `name` inside `out_dir` that marks the nested
/// project root, as a path relative to `out_dir`.
///
/// `node_modules` subtrees are skipped, and so is any match that sits below
/// another directory of the same name. Among the remaining matches the
/// deepest one wins.
pub fn find_nested_project_dir(out_dir: &Path, name: &OsStr) -> Option<PathBuf> {
    WalkDir::new(out_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir() && entry.file_name() == name)
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(out_dir).ok()?.to_path_buf();
            let occurrences = relative
                .components()
                .filter(|component| matches!(component, Component::Normal(part) if *part == name))
                .count();
            (occurrences == 1).then_some(relative)
        })
        .max_by_key(|relative| relative.components().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_nesting_in_flat_output() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        fs::create_dir_all(project.join("dist/pages")).unwrap();

        let layout = ProjectLayout::new(&project, project.join("dist"), ".");
        assert_eq!(layout.nested_offset(), None);
        assert_eq!(layout.detect_nesting(), None);
        assert!(!layout.has_extra_module());
        assert_eq!(layout.out_base_dir(), project.join("dist"));
    }

    #[test]
    fn test_detects_nested_project_directory() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        fs::create_dir_all(project.join("dist/app/src")).unwrap();
        fs::create_dir_all(project.join("dist/shared")).unwrap();

        let layout = ProjectLayout::new(&project, project.join("dist"), ".");
        assert!(!layout.has_extra_module());
        assert_eq!(layout.detect_nesting(), Some(Path::new("app")));
        assert!(layout.has_extra_module());
        assert_eq!(layout.out_base_dir(), project.join("dist/app"));
    }

    #[test]
    fn test_detection_runs_once() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        fs::create_dir_all(project.join("dist")).unwrap();

        let layout = ProjectLayout::new(&project, project.join("dist"), ".");
        assert_eq!(layout.detect_nesting(), None);

        fs::create_dir_all(project.join("dist/app")).unwrap();
        assert_eq!(layout.detect_nesting(), None);
    }

    #[test]
    fn test_skips_node_modules_and_repeated_names() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("node_modules/pkg/app/deeper/dir")).unwrap();
        fs::create_dir_all(out.join("packages/app/lib/app")).unwrap();

        assert_eq!(
            find_nested_project_dir(&out, OsStr::new("app")),
            Some(PathBuf::from("packages/app"))
        );
    }

    #[test]
    fn test_deepest_match_wins() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("app")).unwrap();
        fs::create_dir_all(out.join("packages/web/app")).unwrap();

        assert_eq!(
            find_nested_project_dir(&out, OsStr::new("app")),
            Some(PathBuf::from("packages/web/app"))
        );
    }

    #[test]
    fn test_base_url_is_applied_under_out_dir() {
        let layout = ProjectLayout::new("/repo/app", "/repo/app/dist", "src");
        assert_eq!(layout.out_base_dir(), PathBuf::from("/repo/app/dist/src"));
        assert_eq!(layout.base_url_dir(), PathBuf::from("/repo/app/src"));

        let layout = ProjectLayout::new("/repo/app", "/repo/app/dist", "/repo/app/src");
        assert_eq!(layout.base_url(), "src");
    }
}
