//! Value parsers for command-line flags.

/// Parse an `--input-glob` value.
///
/// The value is the extension part of a glob, with or without braces. A
/// leading `*.` or `.` is tolerated and stripped.
pub fn parse_input_glob(s: &str) -> Result<String, String> {
    let glob = s.trim();
    let glob = glob.strip_prefix("*.").or_else(|| glob.strip_prefix('.')).unwrap_or(glob);
    if glob.is_empty() {
        return Err("Input glob cannot be empty".to_string());
    }

    let mut depth = 0i32;
    for c in glob.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            '/' | '\\' => {
                return Err(format!(
                    "Input glob is an extension pattern and cannot contain path separators: '{}'",
                    s
                ));
            }
            _ => {}
        }
        if depth < 0 {
            break;
        }
    }
    if depth != 0 {
        return Err(format!("Unbalanced braces in input glob: '{}'", s));
    }

    Ok(glob.to_string())
}

/// Parse one `--output-check` extension, e.g. `js` or `.d.ts`.
pub fn parse_extension(s: &str) -> Result<String, String> {
    let ext = s.trim().trim_start_matches('.');
    if ext.is_empty() {
        return Err("Extension cannot be empty".to_string());
    }
    if ext.ends_with('.') || ext.contains(['/', '\\', '*', '{', '}']) {
        return Err(format!("Invalid extension: '{}'", s));
    }
    Ok(ext.to_string())
}

/// Parse a `--replacer` name.
pub fn parse_replacer_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("Replacer name cannot be empty".to_string());
    }
    Ok(name.to_string())
}
