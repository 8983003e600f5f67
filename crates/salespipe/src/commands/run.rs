//! CLI command for running the pipeline

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use sales_pipeline_core::pipeline::{PipelineConfig, PipelineExecutor};

use crate::error::CliError;

/// Arguments for the `run` command
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to the raw sales CSV extract
    #[arg(long)]
    pub input: PathBuf,

    /// Directory all pipeline outputs are written under
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Store location override (defaults to <output-dir>/<run-date>/sales.duckdb)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Run date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub run_date: Option<NaiveDate>,

    /// Mirror stage progress to stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Handle the `run` command
pub fn handle_run(args: &RunArgs) -> Result<(), CliError> {
    let mut config = PipelineConfig::new()
        .with_input(&args.input)
        .with_output_dir(&args.output_dir)
        .with_verbose(args.verbose);
    if let Some(ref database) = args.database {
        config = config.with_database(database);
    }
    if let Some(run_date) = args.run_date {
        config = config.with_run_date(run_date);
    }

    let mut executor =
        PipelineExecutor::new(config).map_err(|e| CliError::Pipeline(e.user_message()))?;

    info!(run_date = %executor.config().run_stamp(), "Starting pipeline run");
    eprintln!("Starting pipeline run for {}", executor.config().run_stamp());

    // A failed stage comes back inside the report; a hard error here means
    // the run log itself could not be appended.
    let report = executor
        .run()
        .map_err(|e| CliError::Pipeline(e.user_message()))?;

    report.print_summary();

    if report.is_success() {
        eprintln!();
        eprintln!("Pipeline completed successfully.");
        Ok(())
    } else {
        Err(CliError::Pipeline(
            report
                .error
                .unwrap_or_else(|| "pipeline run failed".to_string()),
        ))
    }
}
