//! Readiness probes for a run profile.
//!
//! `check` answers "is this profile usable right now": can we reach the
//! server, are the tables a deployment depends on present, and do the source
//! files exist on disk. Every probe runs regardless of earlier failures so one
//! report covers the whole profile.

use anyhow::{Result, bail};
use itertools::Itertools;

use crate::{
    cli::CheckArgs,
    config::RunProfile,
    database::{MysqlBackend, SchemaBackend},
};

enum Probe {
    Pass,
    Fail(String),
}

struct CheckResult {
    label: &'static str,
    passed: bool,
    message: String,
}

pub fn execute(args: &CheckArgs) -> Result<()> {
    let profile = RunProfile::load(&args.config)?;
    let mut results = Vec::new();

    run_check(&mut results, "Database connection", || {
        let mut backend = MysqlBackend::connect(&profile.database)?;
        backend.ping()?;
        Ok(Probe::Pass)
    });

    run_check(&mut results, "Required tables", || {
        // Existence checks go through information_schema, so nothing is
        // created or selected on a host that lacks the database.
        let mut backend = MysqlBackend::connect(&profile.database)?;
        for table in &profile.required_tables {
            if !backend.table_exists(table)? {
                return Ok(Probe::Fail(format!("{table} missing")));
            }
        }
        Ok(Probe::Pass)
    });

    run_check(&mut results, "Source files", || {
        for source in &profile.sources {
            if !source.exists() {
                return Ok(Probe::Fail(format!("{} missing", source.display())));
            }
        }
        Ok(Probe::Pass)
    });

    let mut failures = Vec::new();
    for result in &results {
        let status = if result.passed { "[OK]" } else { "[FAIL]" };
        println!("{status} {}: {}", result.label, result.message);
        if !result.passed {
            failures.push(result.label);
        }
    }
    if !failures.is_empty() {
        bail!("Checks failed: {}", failures.iter().join(", "));
    }
    Ok(())
}

fn run_check<F>(results: &mut Vec<CheckResult>, label: &'static str, probe: F)
where
    F: FnOnce() -> Result<Probe>,
{
    let (passed, message) = match probe() {
        Ok(Probe::Pass) => (true, "ok".to_string()),
        Ok(Probe::Fail(message)) => (false, message),
        Err(err) => (false, err.to_string()),
    };
    results.push(CheckResult {
        label,
        passed,
        message,
    });
}
