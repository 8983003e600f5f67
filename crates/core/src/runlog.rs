//! Append-only run ledger
//!
//! One [RunSummary] row per invocation, success or failure. The header is
//! written exactly once (file missing or empty); rows are never rewritten.
//! Each record is assembled in memory and written through a single
//! `write_all` on an `O_APPEND` handle, so concurrent invocations interleave
//! at line granularity rather than corrupting each other.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::records::RunSummary;

/// Fixed filename of the run log inside the output directory.
pub const RUN_LOG_FILENAME: &str = "pipeline_log.csv";

/// Errors that can occur while appending to or reading the run log
#[derive(Error, Debug)]
pub enum RunLogError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Handle to the long-lived run log at a fixed path.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Create a handle for the log at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log's path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append exactly one summary row, creating the log with a header first
    /// if it does not exist yet.
    pub fn append(&self, summary: &RunSummary) -> Result<(), RunLogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(Vec::new());
        writer.serialize(summary)?;
        let buf = writer
            .into_inner()
            .map_err(|e| RunLogError::Io(std::io::Error::other(e.to_string())))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&buf)?;

        debug!(log = %self.path.display(), status = %summary.status, "Appended run summary");
        Ok(())
    }

    /// Read every row of the log in append order.
    pub fn read_all(&self) -> Result<Vec<RunSummary>, RunLogError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<RunSummary>, csv::Error>>()?;
        Ok(rows)
    }

    /// Read the last `n` rows of the log in append order.
    pub fn tail(&self, n: usize) -> Result<Vec<RunSummary>, RunLogError> {
        let mut rows = self.read_all()?;
        let skip = rows.len().saturating_sub(n);
        Ok(rows.split_off(skip))
    }
}
