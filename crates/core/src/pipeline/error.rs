//! Error types for pipeline execution
//!
//! Stage errors chain for debugging while keeping user-friendly messages for
//! CLI output. Dropped rows during cleaning are not errors and never appear
//! here; only coercion failures on kept rows do.

use thiserror::Error;

use crate::chart::RenderError;
use crate::clean::CoercionError;
use crate::ingest::IngestError;
use crate::store::PersistError;

/// Errors that can occur during pipeline execution
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pipeline configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ingest stage failure (source missing or unparseable)
    #[error("Ingest failed: {0}")]
    Ingest(#[from] IngestError),

    /// Clean stage failure (kept row with unconvertible numeric field)
    #[error("Cleaning failed: {0}")]
    Coercion(#[from] CoercionError),

    /// Persist stage failure (store write)
    #[error("Persist failed: {0}")]
    Persist(#[from] PersistError),

    /// Aggregate stage failure (aggregate file write)
    #[error("Aggregate export failed: {0}")]
    Aggregate(String),

    /// Chart stage failure
    #[error("Chart rendering failed: {0}")]
    Render(#[from] RenderError),

    /// Run log append failure
    #[error("Run log append failed: {0}")]
    RunLog(String),

    /// IO error (storage layout)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Get the stage name if this error maps to a specific stage
    pub fn stage_name(&self) -> Option<&'static str> {
        match self {
            PipelineError::Ingest(_) => Some("ingest"),
            PipelineError::Coercion(_) => Some("clean"),
            PipelineError::Persist(_) => Some("persist"),
            PipelineError::Aggregate(_) => Some("aggregate"),
            PipelineError::Render(_) => Some("chart"),
            _ => None,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Config(msg) => {
                format!("Configuration error: {msg}\n\nHint: Check the input and output paths.")
            }
            PipelineError::Ingest(err) => err.user_message(),
            PipelineError::Coercion(err) => {
                format!(
                    "Cleaning failed: {err}\n\n\
                    Hint: quantity and price must be numeric on every row that passes filtering."
                )
            }
            PipelineError::RunLog(msg) => {
                format!(
                    "Run log append failed: {msg}\n\n\
                    Hint: The run log must stay writable; check permissions on the output directory."
                )
            }
            _ => self.to_string(),
        }
    }
}
