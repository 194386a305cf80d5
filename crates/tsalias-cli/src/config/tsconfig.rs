//! tsconfig loading.
//!
//! Reads the handful of `compilerOptions` the rewriter needs plus the
//! `"tsalias"` section, following `extends` chains. Files may contain
//! comments and trailing commas.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::Deserialize;
use tracing::debug;
use tsalias_core::PathAliases;

use crate::error::ConfigError;

/// Placeholder replaced with the directory of the root tsconfig.
pub const CONFIG_DIR_PLACEHOLDER: &str = "${configDir}";

/// Name of the tool section inside a tsconfig.
pub const TOOL_SECTION: &str = "tsalias";

/// The flattened result of a tsconfig and everything it extends.
///
/// Directory options are absolute, resolved against the file that declared
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsConfig {
    /// The root tsconfig file
    pub file: PathBuf,
    pub base_url: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub declaration_dir: Option<PathBuf>,
    pub paths: Option<PathAliases>,
    /// The `"tsalias"` section, merged key by key along the chain
    pub tool: Option<serde_json::Value>,
}

impl TsConfig {
    /// Directory of the root tsconfig.
    pub fn config_dir(&self) -> &Path {
        self.file.parent().unwrap_or(Path::new(""))
    }

    /// Take every value `child` sets.
    fn absorb(&mut self, child: TsConfig) {
        if child.base_url.is_some() {
            self.base_url = child.base_url;
        }
        if child.out_dir.is_some() {
            self.out_dir = child.out_dir;
        }
        if child.declaration_dir.is_some() {
            self.declaration_dir = child.declaration_dir;
        }
        if child.paths.is_some() {
            self.paths = child.paths;
        }
        self.tool = match (self.tool.take(), child.tool) {
            (Some(serde_json::Value::Object(mut parent)), Some(serde_json::Value::Object(child))) => {
                parent.extend(child);
                Some(serde_json::Value::Object(parent))
            }
            (parent, child) => child.or(parent),
        };
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    #[serde(default)]
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    #[serde(default, rename = "tsalias")]
    tool: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    out_dir: Option<String>,
    declaration_dir: Option<String>,
    paths: Option<PathAliases>,
}

/// Load `file` and the chain of configs it extends.
pub fn load_tsconfig(file: &Path) -> Result<TsConfig, ConfigError> {
    let file = tsalias_core::paths::absolutize(file);
    if !file.is_file() {
        return Err(ConfigError::NotFound(file));
    }

    let root_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut chain = Vec::new();
    let mut config = load_chain(&file, &root_dir, &mut chain)?;
    config.file = file;
    Ok(config)
}

fn load_chain(file: &Path, root_dir: &Path, chain: &mut Vec<PathBuf>) -> Result<TsConfig, ConfigError> {
    if chain.iter().any(|seen| seen == file) {
        return Err(ConfigError::CircularExtends(file.to_path_buf()));
    }
    chain.push(file.to_path_buf());
    debug!(file = %file.display(), "reading tsconfig");

    let text = std::fs::read_to_string(file).map_err(|source| ConfigError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let raw: RawTsConfig =
        serde_json::from_str(&strip_jsonc(&text)).map_err(|source| ConfigError::InvalidJson {
            path: file.to_path_buf(),
            source,
        })?;

    let dir = file.parent().unwrap_or(Path::new(""));
    let mut config = TsConfig::default();

    let parents = match raw.extends {
        Some(Extends::One(entry)) => vec![entry],
        Some(Extends::Many(entries)) => entries,
        None => Vec::new(),
    };
    for entry in parents {
        let parent = resolve_extends(&entry, dir).ok_or_else(|| ConfigError::ExtendsNotFound {
            extends: entry.clone(),
            from: file.to_path_buf(),
        })?;
        config.absorb(load_chain(&parent, root_dir, chain)?);
    }

    let options = raw.compiler_options;
    let resolve_dir = |value: String| resolve_option_path(&value, dir, root_dir);
    config.absorb(TsConfig {
        file: file.to_path_buf(),
        base_url: options.base_url.map(resolve_dir),
        out_dir: options.out_dir.map(resolve_dir),
        declaration_dir: options.declaration_dir.map(resolve_dir),
        paths: options.paths.map(|paths| substitute_paths(paths, root_dir)),
        tool: raw.tool,
    });

    chain.pop();
    Ok(config)
}

/// Resolve a path-valued option against the directory of the config that
/// declares it.
fn resolve_option_path(value: &str, declaring_dir: &Path, root_dir: &Path) -> PathBuf {
    let value = substitute_config_dir(value, root_dir);
    let path = Path::new(&value);
    if path.is_absolute() {
        path.clean()
    } else {
        declaring_dir.join(path).clean()
    }
}

fn substitute_paths(paths: PathAliases, root_dir: &Path) -> PathAliases {
    paths
        .into_iter()
        .map(|(pattern, candidates)| {
            let candidates = candidates
                .iter()
                .map(|candidate| substitute_config_dir(candidate, root_dir))
                .collect();
            (pattern, candidates)
        })
        .collect()
}

fn substitute_config_dir(value: &str, root_dir: &Path) -> String {
    if value.contains(CONFIG_DIR_PLACEHOLDER) {
        value.replace(CONFIG_DIR_PLACEHOLDER, &root_dir.to_string_lossy())
    } else {
        value.to_string()
    }
}

/// Find the file an `extends` entry points to.
///
/// Relative and absolute entries resolve against `from_dir`, with `.json`
/// appended when missing. Anything else is looked up in the `node_modules`
/// directories of `from_dir` and its ancestors, either as a file or as a
/// package directory holding `tsconfig.json`.
pub fn resolve_extends(entry: &str, from_dir: &Path) -> Option<PathBuf> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    if entry.starts_with('.') || Path::new(entry).is_absolute() {
        let base = from_dir.join(entry).clean();
        return file_candidates(&base, entry).into_iter().find(|p| p.is_file());
    }

    from_dir.ancestors().find_map(|ancestor| {
        let base = ancestor.join("node_modules").join(entry);
        file_candidates(&base, entry).into_iter().find(|p| p.is_file())
    })
}

fn file_candidates(base: &Path, entry: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if entry.ends_with(".json") {
        candidates.push(base.to_path_buf());
    } else {
        candidates.push(with_json_extension(base));
        candidates.push(base.to_path_buf());
    }
    candidates.push(base.join("tsconfig.json"));
    candidates
}

fn with_json_extension(path: &Path) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(".json");
    PathBuf::from(raw)
}

/// Strip `//` and `/* */` comments and trailing commas so the text parses
/// as plain JSON. String contents are left alone.
pub fn strip_jsonc(input: &str) -> String {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}
