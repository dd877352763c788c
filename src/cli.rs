use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Typed CSV data source with live reload", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the column schema declared by a file's annotated header
    Schema(SourceArgs),
    /// Load a file and print all of its typed rows
    Show(ShowArgs),
    /// Load a file, print its rows, then stream add/update/remove operations as it changes
    Watch(WatchArgs),
    /// List candidate data files in a directory
    List(ListArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Backing CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter (a single character, or 'tab', 'comma', 'pipe', 'semicolon')
    #[arg(long, default_value = ",")]
    pub delimiter: String,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
    /// Quiet period used to coalesce bursts of change notifications (0 disables)
    #[arg(long = "debounce-ms", default_value_t = 100)]
    pub debounce_ms: u64,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directory to scan for .csv, .tsv and .txt files
    #[arg(short = 'r', long = "root", default_value = ".")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
