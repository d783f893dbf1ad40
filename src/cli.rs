use clap::{Args, Parser, Subcommand};
use diskwise_core::model::parse_size;
use std::path::PathBuf;

/// DiskWise - find what is using your disk and clean it up safely
#[derive(Parser, Debug)]
#[command(name = "diskwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory and show where the space goes
    Scan(ScanArgs),

    /// Show the cleanup category and risk of paths
    Classify(ClassifyArgs),

    /// Delete a file or directory (protected locations are refused)
    Delete(DeleteArgs),

    /// List drives that can be scanned
    Drives,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan
    pub root: PathBuf,

    /// Hide entries smaller than this (e.g. 100KB, 1.5GB); overrides the config
    #[arg(long, value_name = "SIZE", value_parser = parse_size_arg)]
    pub min_size: Option<u64>,

    /// Number of directory levels to expand below the root
    #[arg(short, long, default_value = "1", value_name = "N")]
    pub depth: usize,

    /// Print the expanded tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Write a diagnostic scan log to this file (truncated first)
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Paths to classify; they do not need to exist
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Treat every path as a directory (disables the extension rule)
    #[arg(long)]
    pub dir: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// File or directory to delete
    pub path: PathBuf,

    /// Remove a directory and everything in it, ignoring individual failures
    #[arg(short, long)]
    pub force: bool,
}

fn parse_size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).ok_or_else(|| format!("invalid size '{s}' (expected e.g. 4096, 100KB, 1.5GB)"))
}
