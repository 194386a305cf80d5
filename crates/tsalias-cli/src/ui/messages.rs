//! Status message functions for terminal output.

use owo_colors::{OwoColorize, Stream};

use super::is_quiet;

/// Print a success message to stderr.
///
/// ```no_run
/// use tsalias_cli::ui::success;
///
/// success("12 files updated");
/// ```
pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!(
        "{} {}",
        "✓".if_supports_color(Stream::Stderr, |t| t.green().bold().to_string()),
        message
    );
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!(
        "{} {}",
        "ℹ".if_supports_color(Stream::Stderr, |t| t.blue().bold().to_string()),
        message
    );
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stream::Stderr, |t| t.yellow().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}

/// Print an error message to stderr. Shown even when silent.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stream::Stderr, |t| t.red().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.red())
    );
}

/// Print a debug message to stderr (only if RUST_LOG is set).
pub fn debug(message: &str) {
    if is_quiet() || std::env::var("RUST_LOG").is_err() {
        return;
    }
    eprintln!(
        "{} {}",
        "◆".if_supports_color(Stream::Stderr, |t| t.dimmed()),
        message.if_supports_color(Stream::Stderr, |t| t.dimmed())
    );
}
