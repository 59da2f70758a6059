//! The merge run journal.
//!
//! Unlike the `log` crate diagnostics (stderr, operator-tunable), the journal
//! is a deliverable of the run: an append-only file with one timestamped line
//! per event, each line echoed to stdout. It is opened for the duration of a
//! single run and flushed on every write so a crash mid-run loses nothing.

use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::Local;

pub trait Journal {
    fn record(&self, message: &str);
}

pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("Creating log directory {dir:?}"))?;
        let name = format!("merge_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Opening run log {path:?}"))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Journal for RunLog {
    fn record(&self, message: &str) {
        let line = format!("[{}] {}", Local::now().to_rfc3339(), message);
        println!("{line}");
        // The line is already on stdout; a failed file write is not fatal.
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}
