use tsalias_core::rewrite::input_globset;

use crate::cli::parse_extension;
use crate::config::Settings;
use crate::error::{ConfigError, Result};

impl Settings {
    /// Validate settings coming from tsconfig and the environment; flags
    /// are already checked by clap.
    pub fn validate(&self) -> Result<()> {
        if let Some(glob) = self.file_extensions.input_glob.as_deref() {
            if let Err(e) = input_globset(glob) {
                return Err(ConfigError::InvalidValue {
                    field: "fileExtensions.inputGlob".to_string(),
                    value: glob.to_string(),
                    hint: format!("Use an extension glob such as {{js,mjs}} ({e})"),
                }
                .into());
            }
        }

        if let Some(extensions) = &self.file_extensions.output_check {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "fileExtensions.outputCheck".to_string(),
                    value: "[]".to_string(),
                    hint: "List at least one extension or remove the field".to_string(),
                }
                .into());
            }
            for ext in extensions {
                if let Err(reason) = parse_extension(ext) {
                    return Err(ConfigError::InvalidValue {
                        field: "fileExtensions.outputCheck".to_string(),
                        value: ext.clone(),
                        hint: reason,
                    }
                    .into());
                }
            }
        }

        if self.replacers.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "replacers".to_string(),
                value: "\"\"".to_string(),
                hint: "Replacer names cannot be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
