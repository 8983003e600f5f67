//! CSV ingestion into raw in-memory rows

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::records::RawRecord;

/// Errors that can occur while reading the raw extract
#[derive(Error, Debug)]
pub enum IngestError {
    /// Source file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Source exists but is not parseable as tabular data
    #[error("Invalid file format: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },
}

impl IngestError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            IngestError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\nHint: Check that the file exists and the path is correct.",
                    path.display()
                )
            }
            IngestError::InvalidFormat { path, reason } => {
                format!(
                    "Invalid file format: {}\nReason: {reason}\n\n\
                    Hint: The input must be a CSV with an order_id,date,region,quantity,price header.",
                    path.display()
                )
            }
        }
    }
}

/// Read the raw sales extract at `path` into memory.
///
/// Columns beyond the five known ones are ignored; missing columns and empty
/// cells surface as `None` fields on [RawRecord]. There is no partial-read
/// recovery: the first structural error aborts the whole read.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    if !path.exists() {
        warn!(source = %path.display(), "Input file not found");
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: RawRecord = result.map_err(|e| IngestError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        rows.push(record);
    }

    info!(rows = rows.len(), source = %path.display(), "Read raw records");
    Ok(rows)
}
