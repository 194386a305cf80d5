//! tsalias - rewrite tsconfig path aliases in compiled output.
//!
//! Parses arguments, loads the project, initializes logging and dispatches
//! to a one-shot run or watch mode.

use clap::Parser;
use miette::Result;
use tsalias_cli::{cli, commands, config, error, logger, ui};
use tsalias_core::ReplacerRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    ui::init_colors(args.no_color, args.silent);

    let result = run(&args).await;

    // Convert CLI errors to miette diagnostics for the final report
    result.map_err(error::cli_error_to_miette)
}

async fn run(args: &cli::Cli) -> error::Result<()> {
    let loaded = config::load_project(args)?;

    // `verbose` may also come from the tsconfig section
    logger::init_logger(
        args.verbose || loaded.settings.verbose,
        args.silent,
        args.no_color,
    );

    commands::execute(args, loaded, &ReplacerRegistry::new()).await
}
