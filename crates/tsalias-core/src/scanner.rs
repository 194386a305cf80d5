//! Import statement scanner.
//!
//! Finds `import`/`export ... from`/`require(...)` statements in emitted
//! JavaScript with regular expressions instead of a parser. The grammar:
//!
//! - `import(` / `require(` / `require.resolve(` followed by a quoted string
//! - `import ... from` / `export ... from` followed by a quoted string
//! - bare side-effect `import "x"`
//!
//! There is no lexer: a string literal containing `import x from` followed by
//! another quoted string is reported as a statement. Keywords must stand on a
//! word boundary, so `imported("x")` is not.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

/// Quoted string with matching quotes on both ends.
const QUOTED: &str = r#"(?:"[^"\r\n]*"|'[^'\r\n]*')"#;

static STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    let call = format!(r"\b(?:import|require(?:\s*\.\s*resolve)?)\s*\(\s*{QUOTED}\s*\)");
    let from = format!(r#"\b(?:import|export)\b[^'";]*?\bfrom\s*{QUOTED}"#);
    let bare = format!(r"\bimport\s*{QUOTED}");
    Regex::new(&format!("(?:{call})|(?:{from})|(?:{bare})")).expect("valid statement regex")
});

static SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?P<dq>[^"\r\n]*)"|'(?P<sq>[^'\r\n]*)'"#).expect("valid specifier regex")
});

/// Every import statement in `source`, in order.
///
/// The iterator is lazy; calling again restarts from the beginning.
pub fn import_statements(source: &str) -> impl Iterator<Item = Match<'_>> + '_ {
    STATEMENT.find_iter(source)
}

fn specifier_match<'s>(caps: &Captures<'s>) -> Option<Match<'s>> {
    caps.name("dq").or_else(|| caps.name("sq"))
}

/// Byte range of the specifier (without quotes) inside `statement`.
pub fn specifier_range(statement: &str) -> Option<Range<usize>> {
    let caps = SPECIFIER.captures(statement)?;
    specifier_match(&caps).map(|m| m.range())
}

/// The bare module specifier of an import statement.
pub fn extract_specifier(statement: &str) -> Option<&str> {
    specifier_range(statement).map(|range| &statement[range])
}

/// `statement` with its specifier replaced by `specifier`, quotes kept.
pub fn replace_specifier(statement: &str, specifier: &str) -> Option<String> {
    let range = specifier_range(statement)?;
    let mut out = String::with_capacity(statement.len() + specifier.len());
    out.push_str(&statement[..range.start]);
    out.push_str(specifier);
    out.push_str(&statement[range.end..]);
    Some(out)
}

/// Rebuild `source` with every import statement passed through `replace`.
///
/// Text between statements is copied verbatim. The first error aborts.
pub fn replace_import_statements<F, E>(source: &str, mut replace: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for statement in import_statements(source) {
        out.push_str(&source[last..statement.start()]);
        out.push_str(&replace(statement.as_str())?);
        last = statement.end();
    }
    out.push_str(&source[last..]);
    Ok(out)
}
