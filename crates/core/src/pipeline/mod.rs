//! Pipeline run engine
//!
//! Orchestrates one invocation of the daily sales pipeline:
//!
//! 1. **Ingest**: read the raw CSV extract into memory
//! 2. **Clean**: validate, coerce types, derive total_amount and month
//! 3. **Persist**: replace the cleaned_sales table in the run's store
//! 4. **Aggregate**: summarise by region into a versioned CSV
//! 5. **Chart**: render the region bar chart
//!
//! A failure in any stage skips the remaining ones. Regardless of outcome,
//! exactly one summary row is appended to the run log, which is what makes
//! unattended scheduling safe.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_pipeline_core::pipeline::{PipelineConfig, run_pipeline};
//!
//! let config = PipelineConfig::new()
//!     .with_input("data/raw_sales.csv")
//!     .with_output_dir("output");
//!
//! let report = run_pipeline(config)?;
//! report.print_summary();
//! ```

mod config;
mod error;
mod executor;

pub use config::{PipelineConfig, PipelineStage};
pub use error::{PipelineError, PipelineResult};
pub use executor::{PipelineExecutor, PipelineReport, StageOutput};

/// Run a pipeline with the given configuration
///
/// This is a convenience function for simple pipeline execution.
pub fn run_pipeline(config: PipelineConfig) -> PipelineResult<PipelineReport> {
    let mut executor = PipelineExecutor::new(config)?;
    executor.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_run_pipeline_happy_path() {
        let temp = TempDir::new().expect("temp dir");
        let input = temp.path().join("raw_sales.csv");
        std::fs::write(
            &input,
            "order_id,date,region,quantity,price\n1,2024-01-01,East,2,10.0\n",
        )
        .expect("write input");

        let config = PipelineConfig::new()
            .with_input(&input)
            .with_output_dir(temp.path().join("output"))
            .with_run_date(NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"));

        let report = run_pipeline(config).expect("run");
        assert!(report.is_success());
        assert_eq!(report.summary.rows_processed, 1);
    }
}
