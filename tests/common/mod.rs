#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sql_managed::database::{BackendError, SchemaBackend};
use sql_managed::rewrite::{self, StatementKind};
use sql_managed::runlog::Journal;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Journal that collects lines in memory instead of writing a log file.
#[derive(Default)]
pub struct MemoryJournal {
    lines: Mutex<Vec<String>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("journal lock").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Journal for MemoryJournal {
    fn record(&self, message: &str) {
        self.lines
            .lock()
            .expect("journal lock")
            .push(message.to_string());
    }
}

/// In-memory stand-in for the MySQL backend. Tables created through
/// `execute` become visible to later existence checks, mirroring how a real
/// run observes its own effects.
#[derive(Default)]
pub struct FakeBackend {
    pub tables: BTreeMap<String, String>,
    pub executed: Vec<String>,
    pub fail_on: Option<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, definition: &str) -> Self {
        self.tables.insert(name.to_string(), definition.to_string());
        self
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }
}

impl SchemaBackend for FakeBackend {
    fn table_exists(&mut self, table: &str) -> Result<bool, BackendError> {
        Ok(self.tables.contains_key(table))
    }

    fn table_definition(&mut self, table: &str) -> Result<Option<String>, BackendError> {
        Ok(self.tables.get(table).cloned())
    }

    fn execute(&mut self, sql: &str) -> Result<(), BackendError> {
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(BackendError::Execute(format!(
                    "simulated failure on `{needle}`"
                )));
            }
        }
        if let StatementKind::CreateTable { table } = rewrite::classify(sql) {
            self.tables.insert(table, sql.to_string());
        }
        self.executed.push(sql.to_string());
        Ok(())
    }
}
