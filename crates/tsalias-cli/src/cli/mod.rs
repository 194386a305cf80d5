//! Command-line interface definition for tsalias.
//!
//! One flat command: rewrite the aliases of a compiled project once, or keep
//! rewriting with `--watch`. Every flag that changes engine behavior also has
//! a tsconfig (`"tsalias"` section) and `TSALIAS_*` environment counterpart;
//! flags win.

mod validation;

use std::path::PathBuf;

use clap::Parser;

pub use validation::{parse_extension, parse_input_glob, parse_replacer_name};

/// Default project file, relative to the working directory.
pub const DEFAULT_PROJECT: &str = "tsconfig.json";

/// tsalias - rewrite tsconfig path aliases in compiled output
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tsalias",
    version,
    about = "Rewrite tsconfig path aliases in compiled JavaScript into relative paths",
    long_about = "tsalias reads compilerOptions.paths from a tsconfig and rewrites every aliased\n\
                  import in the compiled output (outDir, and declarationDir when set) into a\n\
                  relative path, so the emitted modules run without an alias-aware resolver."
)]
pub struct Cli {
    /// Path to the tsconfig file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_PROJECT)]
    pub project: PathBuf,

    /// Keep running and rewrite output files as the compiler writes them
    #[arg(short, long)]
    pub watch: bool,

    /// Output directory to rewrite, overriding compilerOptions.outDir
    #[arg(long = "dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Declaration directory to rewrite, overriding compilerOptions.declarationDir
    #[arg(long, value_name = "DIR")]
    pub declaration_dir: Option<PathBuf>,

    /// Append the real file extension to relative imports (./utils -> ./utils.js)
    #[arg(short = 'f', long)]
    pub resolve_full_paths: bool,

    /// Enable a registered replacer by name (repeatable)
    #[arg(short, long = "replacer", value_name = "NAME", value_parser = parse_replacer_name)]
    pub replacers: Vec<String>,

    /// Extension glob of files to rewrite, e.g. "{js,mjs,d.ts}"
    #[arg(long, value_name = "GLOB", value_parser = parse_input_glob)]
    pub input_glob: Option<String>,

    /// Extensions probed when checking that an aliased module exists
    #[arg(long, value_name = "EXT", value_delimiter = ',', value_parser = parse_extension)]
    pub output_check: Vec<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            project: PathBuf::from(DEFAULT_PROJECT),
            watch: false,
            out_dir: None,
            declaration_dir: None,
            resolve_full_paths: false,
            replacers: Vec::new(),
            input_glob: None,
            output_check: Vec::new(),
            verbose: false,
            silent: false,
            no_color: false,
        }
    }
}
