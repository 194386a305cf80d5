use std::path::Path;

use tracing::trace;

use super::{BASE_URL_REPLACER, ReplaceContext, Replacer};
use crate::error::{Result, RewriteError};
use crate::paths::{is_relative_specifier, normalize_specifier, relative_specifier};
use crate::scanner::{extract_specifier, replace_specifier};

/// Rewrites non-relative specifiers that name a module directly under the
/// output root, as produced by `baseUrl` module resolution without an alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseUrlReplacer;

impl Replacer for BaseUrlReplacer {
    fn name(&self) -> &str {
        BASE_URL_REPLACER
    }

    fn replace(&self, statement: &str, ctx: &ReplaceContext<'_>) -> Result<String> {
        let malformed = || RewriteError::MalformedStatement {
            file: ctx.file.to_path_buf(),
            statement: statement.to_string(),
        };
        let specifier = extract_specifier(statement).ok_or_else(malformed)?;

        if specifier.is_empty()
            || is_relative_specifier(specifier)
            || Path::new(specifier).is_absolute()
            || ctx
                .trie
                .search(specifier)
                .is_some_and(|alias| alias.matches(specifier))
        {
            return Ok(statement.to_string());
        }

        let out_dir = ctx.layout.out_dir();
        if !ctx.cache.exists(&out_dir.join(specifier)) {
            return Ok(statement.to_string());
        }

        let relative = relative_specifier(ctx.file, out_dir);
        let rewritten = normalize_specifier(&format!("{relative}/{specifier}"));
        trace!(specifier, rewritten = %rewritten, "rewrote base URL import");
        replace_specifier(statement, &rewritten).ok_or_else(malformed)
    }
}
