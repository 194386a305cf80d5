use tracing::{trace, warn};

use super::{DEFAULT_REPLACER, ReplaceContext, Replacer};
use crate::error::{Result, RewriteError};
use crate::paths::{normalize_specifier, relative_specifier};
use crate::scanner::{extract_specifier, replace_specifier};

/// Rewrites aliased specifiers to paths relative to the importing file.
///
/// Candidates are tried in declaration order and the first one that exists
/// in the output tree wins. When none does, the statement is kept as it is
/// and a warning is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasReplacer;

fn malformed(statement: &str, ctx: &ReplaceContext<'_>) -> RewriteError {
    RewriteError::MalformedStatement {
        file: ctx.file.to_path_buf(),
        statement: statement.to_string(),
    }
}

/// Remainder of the specifier as a filesystem probe: no leading slash, and a
/// trailing `.js`/`.json` dropped so extension probing can find the file.
fn probe_suffix(remainder: &str) -> &str {
    let remainder = remainder.trim_start_matches('/');
    remainder
        .strip_suffix(".json")
        .or_else(|| remainder.strip_suffix(".js"))
        .unwrap_or(remainder)
}

impl Replacer for AliasReplacer {
    fn name(&self) -> &str {
        DEFAULT_REPLACER
    }

    fn replace(&self, statement: &str, ctx: &ReplaceContext<'_>) -> Result<String> {
        let specifier = extract_specifier(statement).ok_or_else(|| malformed(statement, ctx))?;

        let Some(alias) = ctx
            .trie
            .search(specifier)
            .filter(|alias| alias.matches(specifier))
        else {
            return Ok(statement.to_string());
        };

        let remainder = &specifier[alias.prefix.len()..];
        for candidate in &alias.candidates {
            let target = ctx
                .cache
                .resolve(&candidate.base_path, &candidate.relative_path);
            let probe = if remainder.is_empty() {
                target.clone()
            } else {
                target.join(probe_suffix(remainder))
            };

            if !ctx.cache.exists(&probe) {
                trace!(specifier, probe = %probe.display(), "alias candidate does not exist");
                continue;
            }

            let relative = relative_specifier(ctx.file, &target);
            let rewritten = normalize_specifier(&format!("{relative}/{remainder}"));
            trace!(specifier, rewritten = %rewritten, "rewrote alias");
            return replace_specifier(statement, &rewritten).ok_or_else(|| malformed(statement, ctx));
        }

        warn!(
            file = %ctx.file.display(),
            specifier,
            "could not resolve alias {}; import left unchanged",
            alias.prefix
        );
        Ok(statement.to_string())
    }
}
