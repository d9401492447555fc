//! Command-line argument definitions for the litloom CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the content units, what to tangle and
//! from which scope, where to write the result, configuration file selection,
//! and logging verbosity.

use clap::Parser;

/// Command-line arguments for the litloom tangler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Content unit manifests (TOML), in authored order
    #[arg(required = true, help = "Paths to the content unit manifests")]
    pub units: Vec<String>,

    /// Fragment to tangle; without it, every `file:` fragment is tangled
    #[arg(short, long)]
    pub root: Option<String>,

    /// Scope to tangle from (default scope if omitted)
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Output file for `--root` (stdout if omitted)
    #[arg(short, long, requires = "root")]
    pub output: Option<String>,

    /// Directory receiving the tangled `file:` fragments
    #[arg(long, default_value = ".", conflicts_with = "root")]
    pub out_dir: String,

    /// List the fragments visible from the scope instead of tangling
    #[arg(long)]
    pub list: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
