//! Error type for CLI commands

use thiserror::Error;

/// Errors surfaced to the operator by the CLI
#[derive(Error, Debug)]
pub enum CliError {
    /// Pipeline run failed
    #[error("{0}")]
    Pipeline(String),

    /// Dashboard could not read an artifact it needs
    #[error("Dashboard error: {0}")]
    Dashboard(String),
}
