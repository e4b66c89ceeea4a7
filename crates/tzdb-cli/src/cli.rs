use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tzdb_store::DEFAULT_DATA_FILE;

#[derive(Parser)]
#[command(
    name = "tzdiff",
    about = "Compare binary time-zone rule databases (tzdb.dat)",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Data file name looked up inside directory arguments
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    pub data_file: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two databases zone by zone
    Diff(DiffArgs),
    /// Summarize a database
    Info(InfoArgs),
    /// Print the rules of one zone
    Show(ShowArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Left database file or directory
    pub left: PathBuf,
    /// Right database file or directory
    pub right: PathBuf,
}

#[derive(Args)]
pub struct InfoArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    pub path: PathBuf,
    /// Zone id, e.g. Europe/Berlin
    pub zone: String,
}
