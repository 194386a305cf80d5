//! Terminal status output.
//!
//! Human-facing lines (`✓ 3 files updated`, warnings) go to stderr through
//! this module; structured diagnostics go through `tracing`. Colors follow
//! `NO_COLOR`, `FORCE_COLOR` and `--no-color`.
//!
//! ```no_run
//! use tsalias_cli::ui;
//!
//! ui::init_colors(false, false);
//! ui::success("3 files updated");
//! ui::warning("Failed to load replacer \"custom\"");
//! ```

mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{debug, error, info, success, warning};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` enables them even without a
/// terminal, otherwise stderr must be attended and not a CI log.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr() && !is_ci()
}

/// Set up status output. Call once from `main`.
///
/// `silent` hides everything except errors.
pub fn init_colors(no_color: bool, silent: bool) {
    owo_colors::set_override(!no_color && should_use_color());
    QUIET.store(silent, Ordering::Relaxed);
}

pub(crate) fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}
