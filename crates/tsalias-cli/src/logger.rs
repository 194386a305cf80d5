//! Logging setup for the tsalias CLI.
//!
//! Engine and CLI both log through `tracing`; this module installs the
//! subscriber. `--verbose` turns on debug output for the tsalias crates,
//! `--silent` keeps only errors, otherwise `RUST_LOG` applies with an
//! `info` fallback.
//!
//! # Example
//!
//! ```rust,no_run
//! use tsalias_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("rewriting dist");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tsalias=debug,tsalias_core=debug,tsalias_cli=debug";
const SILENT_FILTER: &str = "tsalias=error,tsalias_core=error,tsalias_cli=error";
const DEFAULT_FILTER: &str = "tsalias=info,tsalias_core=info,tsalias_cli=info";

/// Initialize the tracing subscriber.
///
/// Call once at the start of the program. `verbose` wins over `quiet`; clap
/// already rejects the two together.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(SILENT_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    init_logger_with_filter(filter, no_color);
}

/// Initialize the subscriber with an explicit filter.
fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedders) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether log output should be colored.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}
