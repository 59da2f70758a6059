//! The merge run: files → splitter → reconciler → execution.
//!
//! The run is deliberately best-effort. Connection and database-creation
//! failures are fatal; everything after that — a missing file, an unreadable
//! file, a statement the server rejects — is journaled and skipped so one bad
//! dump entry cannot sink the rest of the batch. No transaction wraps the run;
//! each statement commits per the server's autocommit behavior.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use log::info;

use crate::{
    cli::MergeArgs,
    config::RunProfile,
    database::{MysqlBackend, SchemaBackend},
    reconcile::{Disposition, Reconciler},
    runlog::{Journal, RunLog},
    splitter,
};

const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn execute(args: &MergeArgs) -> Result<()> {
    let profile = RunProfile::resolve(args)?;
    let journal = RunLog::create(&args.log_dir)?;
    info!("Writing run log to {:?}", journal.path());

    journal.record("--- merge run started ---");
    let mut backend = match MysqlBackend::connect(&profile.database) {
        Ok(backend) => backend,
        Err(err) => {
            journal.record(&format!("ERROR: {err}"));
            return Err(err.into());
        }
    };
    if let Err(err) =
        backend.ensure_database(&profile.database.charset, &profile.database.collation)
    {
        journal.record(&format!("ERROR: {err}"));
        return Err(err.into());
    }
    journal.record(&format!("Database `{}` ensured.", profile.database.name));

    let summary = run_merge(&mut backend, &journal, &profile.sources, args.dry_run);
    journal.record(&format!(
        "--- merge run completed{}: {} file(s) processed, {} skipped; {} statement(s) executed, {} skipped, {} failed ---",
        if args.dry_run { " (dry run)" } else { "" },
        summary.files_processed,
        summary.files_skipped,
        summary.executed,
        summary.skipped,
        summary.failed,
    ));
    Ok(())
}

/// Drives the whole batch against an already-prepared backend. Reconciler
/// state spans all files, so a table created by an earlier file shapes the
/// decisions made for later ones.
pub fn run_merge(
    backend: &mut dyn SchemaBackend,
    journal: &dyn Journal,
    sources: &[PathBuf],
    dry_run: bool,
) -> MergeSummary {
    let mut reconciler = Reconciler::new();
    let mut summary = MergeSummary::default();

    for source in sources {
        if !source.exists() {
            journal.record(&format!(
                "WARNING: Missing file {} - skipping.",
                display_name(source)
            ));
            summary.files_skipped += 1;
            continue;
        }
        journal.record(&format!("Processing {}", display_name(source)));
        let script = match fs::read_to_string(source) {
            Ok(script) => script,
            Err(err) => {
                journal.record(&format!("WARNING: Unable to read file - {err}. Skipping."));
                summary.files_skipped += 1;
                continue;
            }
        };
        summary.files_processed += 1;

        for statement in splitter::split_statements(&script) {
            match reconciler.reconcile(backend, journal, &statement) {
                Ok(Disposition::Execute(sql)) => {
                    if dry_run {
                        journal.record(&format!("DRY RUN: would execute {}", preview(&sql)));
                        summary.executed += 1;
                    } else if let Err(err) = backend.execute(&sql) {
                        journal.record(&format!(
                            "ERROR executing statement: {}... - {err}",
                            preview(&sql)
                        ));
                        summary.failed += 1;
                    } else {
                        summary.executed += 1;
                    }
                }
                Ok(Disposition::Skip) => summary.skipped += 1,
                Err(err) => {
                    journal.record(&format!(
                        "ERROR inspecting schema for statement: {}... - {err}",
                        preview(&statement)
                    ));
                    summary.failed += 1;
                }
            }
        }
    }

    summary
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn preview(sql: &str) -> String {
    sql.chars().take(PREVIEW_CHARS).collect()
}
