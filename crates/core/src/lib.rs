//! Sales Pipeline Core - engine for the daily sales pipeline
//!
//! Provides the stages of one pipeline invocation and their shared types:
//! - CSV ingestion into raw rows
//! - Cleaning, type coercion, and derived fields
//! - Persistence into an embedded queryable store
//! - Region-level aggregation with versioned CSV export
//! - PNG chart rendering
//! - The append-only run log
//!
//! The `pipeline` module ties the stages together; the individual modules
//! are public so the CLI dashboard (and tests) can read artifacts directly.

pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod ingest;
pub mod pipeline;
pub mod records;
pub mod runlog;
pub mod store;

// Re-export commonly used types
pub use pipeline::{
    PipelineConfig, PipelineError, PipelineExecutor, PipelineReport, PipelineStage, run_pipeline,
};
pub use records::{CleanedRecord, RawRecord, RegionAggregate, RunStatus, RunSummary};
pub use runlog::{RUN_LOG_FILENAME, RunLog};
