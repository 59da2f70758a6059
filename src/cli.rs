use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Merge SQL dump files into a shared MySQL database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge one or more SQL dump files into the target database
    Merge(MergeArgs),
    /// Split a SQL script into individual statements without executing them
    Split(SplitArgs),
    /// Probe a run profile: connectivity, required tables, source files
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// YAML run profile with connection settings and the ordered source list
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// SQL dump file to merge; repeatable, appended to the profile's list
    #[arg(short = 'i', long = "source", action = clap::ArgAction::Append)]
    pub sources: Vec<PathBuf>,
    /// MySQL server host (overrides the profile)
    #[arg(long)]
    pub host: Option<String>,
    /// MySQL server port (overrides the profile)
    #[arg(long)]
    pub port: Option<u16>,
    /// MySQL user (overrides the profile)
    #[arg(long)]
    pub user: Option<String>,
    /// MySQL password (overrides the profile)
    #[arg(long)]
    pub password: Option<String>,
    /// Target database name (overrides the profile)
    #[arg(short = 'd', long)]
    pub database: Option<String>,
    /// Directory for the run log file
    #[arg(long = "log-dir", default_value = "logs")]
    pub log_dir: PathBuf,
    /// Resolve every decision and write the log without executing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input SQL script
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Emit the statements as a JSON array instead of re-terminated text
    #[arg(long)]
    pub json: bool,
    /// Print only the number of statements
    #[arg(long)]
    pub count: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// YAML run profile to probe
    #[arg(short, long)]
    pub config: PathBuf,
}
