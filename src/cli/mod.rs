use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diffscan", about = "Inspect unified git diffs")]
pub struct Cli {
    /// Read the diff from this file instead of stdin.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Output format.
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Print file and added/removed line counts.
    Stats,
    /// List changed files.
    Files,
    /// List hunks with their content hash.
    Hunks,
    /// List added lines with new-file line numbers.
    Added,
    /// List removed lines.
    Removed,
    /// Print the content-addressed cache key of the parsed diff.
    Key,
    /// Print the whole parsed model.
    Dump,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}
