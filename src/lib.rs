pub mod check;
pub mod cli;
pub mod config;
pub mod database;
pub mod merge;
pub mod reconcile;
pub mod rewrite;
pub mod runlog;
pub mod splitter;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sql_managed", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => merge::execute(&args),
        Commands::Split(args) => handle_split(&args),
        Commands::Check(args) => check::execute(&args),
    }
}

fn handle_split(args: &cli::SplitArgs) -> Result<()> {
    let script = fs::read_to_string(&args.input)
        .with_context(|| format!("Reading SQL script {:?}", args.input))?;
    let statements = splitter::split_statements(&script);
    info!(
        "Split {} statement(s) from '{}'",
        statements.len(),
        args.input.display()
    );
    if args.count {
        println!("{}", statements.len());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        for statement in &statements {
            println!("{statement};");
        }
    }
    Ok(())
}
