//! Schema-collision reconciliation.
//!
//! Dump files regularly redefine tables that already exist in the shared
//! database, either because two applications carry the same core schema or
//! because an earlier file in the same run created them. The reconciler
//! inspects every statement in batch order and decides, once per table name,
//! what to do about a collision:
//!
//! - table absent → create as-is;
//! - existing definition textually identical (after normalization) → skip the
//!   create, make later inserts duplicate-tolerant, drop later alters;
//! - existing definition diverges → create under an alternate name and retarget
//!   every later statement that references the original name.
//!
//! Decisions are terminal for the rest of the run: a name lives in at most one
//! of the rename map or the identical set, and once recorded it is never
//! moved.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    database::{BackendError, SchemaBackend},
    rewrite::{self, StatementKind},
    runlog::Journal,
};

/// What the run loop should do with a reconciled statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Execute(String),
    Skip,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    renames: HashMap<String, String>,
    identical: HashSet<String>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename_target(&self, table: &str) -> Option<&str> {
        self.renames.get(table).map(String::as_str)
    }

    pub fn is_identical(&self, table: &str) -> bool {
        self.identical.contains(table)
    }

    /// Processes one statement in batch order, updating the collision state
    /// and returning the statement to execute (possibly rewritten) or a skip
    /// signal.
    pub fn reconcile(
        &mut self,
        backend: &mut dyn SchemaBackend,
        journal: &dyn Journal,
        statement: &str,
    ) -> Result<Disposition, BackendError> {
        match rewrite::classify(statement) {
            StatementKind::CreateTable { table } => {
                self.reconcile_create(backend, journal, statement, &table)
            }
            StatementKind::DmlInto { table } => Ok(self.reconcile_dml(statement, &table)),
            StatementKind::AlterTable { table } => {
                Ok(self.reconcile_alter(journal, statement, &table))
            }
            StatementKind::Other => Ok(Disposition::Execute(statement.to_string())),
        }
    }

    fn reconcile_create(
        &mut self,
        backend: &mut dyn SchemaBackend,
        journal: &dyn Journal,
        statement: &str,
        table: &str,
    ) -> Result<Disposition, BackendError> {
        // A repeated CREATE for an already-decided name reuses the decision.
        if self.identical.contains(table) {
            journal.record(&format!(
                "Table {table} already present with identical schema. Skipping create."
            ));
            return Ok(Disposition::Skip);
        }
        if let Some(candidate) = self.renames.get(table) {
            return Ok(Disposition::Execute(rewrite::rename_create_target(
                statement, candidate,
            )));
        }

        let Some(existing) = backend.table_definition(table)? else {
            return Ok(Disposition::Execute(statement.to_string()));
        };
        if rewrite::normalize_sql(&existing) == rewrite::normalize_sql(statement) {
            self.identical.insert(table.to_string());
            journal.record(&format!(
                "Table {table} already present with identical schema. Skipping create."
            ));
            return Ok(Disposition::Skip);
        }

        let candidate = fresh_table_name(table, |name| backend.table_exists(name))?;
        journal.record(&format!(
            "Table {table} exists with different schema. Renaming import to {candidate}."
        ));
        let rewritten = rewrite::rename_create_target(statement, &candidate);
        self.renames.insert(table.to_string(), candidate);
        Ok(Disposition::Execute(rewritten))
    }

    fn reconcile_dml(&self, statement: &str, table: &str) -> Disposition {
        if let Some(candidate) = self.renames.get(table) {
            Disposition::Execute(rewrite::rename_dml_target(statement, candidate))
        } else if self.identical.contains(table) {
            Disposition::Execute(rewrite::make_insert_ignore(statement))
        } else {
            Disposition::Execute(statement.to_string())
        }
    }

    fn reconcile_alter(&self, journal: &dyn Journal, statement: &str, table: &str) -> Disposition {
        if let Some(candidate) = self.renames.get(table) {
            Disposition::Execute(rewrite::rename_alter_target(statement, candidate))
        } else if self.identical.contains(table) {
            journal.record(&format!(
                "Skipping ALTER for table {table} because schema already present."
            ));
            Disposition::Skip
        } else {
            Disposition::Execute(statement.to_string())
        }
    }
}

/// Picks a table name not present per the taken-check: `<base>_v2` first,
/// then random-token candidates until one is free.
pub(crate) fn fresh_table_name<F>(base: &str, mut taken: F) -> Result<String, BackendError>
where
    F: FnMut(&str) -> Result<bool, BackendError>,
{
    let mut candidate = format!("{base}_v2");
    while taken(&candidate)? {
        let token = Uuid::new_v4().simple().to_string();
        candidate = format!("{base}_v{}", &token[..8]);
    }
    Ok(candidate)
}
