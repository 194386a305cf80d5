use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::Serialize;
use tsalias_core::{FileExtensions, ReplacerOption, ReplacerOptions};

use crate::cli::Cli;
use crate::config::{ENV_PREFIX, Settings};
use crate::error::{ConfigError, Result};

/// The flags that override tool settings. Unset flags are left out so they
/// don't mask lower layers.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "ReplacerOptions::is_empty")]
    replacers: ReplacerOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolve_full_paths: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verbose: Option<bool>,
    file_extensions: FileExtensions,
}

impl CliOverrides {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            replacers: cli
                .replacers
                .iter()
                .map(|name| (name.clone(), ReplacerOption::enabled()))
                .collect(),
            resolve_full_paths: cli.resolve_full_paths.then_some(true),
            verbose: cli.verbose.then_some(true),
            file_extensions: FileExtensions {
                input_glob: cli.input_glob.clone(),
                output_check: (!cli.output_check.is_empty()).then(|| cli.output_check.clone()),
            },
        }
    }
}

impl Settings {
    /// Merge tool settings.
    /// Priority: CLI flags > environment variables > tsconfig section > defaults
    pub fn load(section: Option<&serde_json::Value>, cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(section) = section {
            figment = figment.merge(Serialized::defaults(section));
        }

        // TSALIAS_RESOLVE_FULL_PATHS, TSALIAS_FILE_EXTENSIONS__INPUT_GLOB, ...
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .map(|key| camel_case_key(key.as_str()).into())
                .lowercase(false),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from_cli(cli)));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "tsalias".to_string(),
                value: e.to_string(),
                hint: "Check the \"tsalias\" section of tsconfig.json and TSALIAS_* variables".to_string(),
            }
            .into()
        })
    }
}

/// `resolve_full_paths` -> `resolveFullPaths`, segment by segment for
/// nested keys.
pub(crate) fn camel_case_key(key: &str) -> String {
    key.split('.')
        .map(|segment| {
            let mut words = segment.split('_').filter(|w| !w.is_empty());
            let mut out = words.next().map(str::to_ascii_lowercase).unwrap_or_default();
            for word in words {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                    out.push_str(&chars.as_str().to_ascii_lowercase());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}
