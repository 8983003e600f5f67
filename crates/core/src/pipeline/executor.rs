//! Pipeline executor: runs the stage sequence and always logs the outcome

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{error, info, info_span};

use super::config::{PipelineConfig, PipelineStage};
use super::error::{PipelineError, PipelineResult};
use crate::records::{CleanedRecord, RawRecord, RegionAggregate, RunStatus, RunSummary};
use crate::runlog::RunLog;
use crate::store::SalesDb;
use crate::{aggregate, chart, clean, ingest};

/// Pipeline executor that runs all stages for one invocation
pub struct PipelineExecutor {
    config: PipelineConfig,
}

/// Data carried between stages of one invocation.
#[derive(Default)]
struct RunState {
    raw: Vec<RawRecord>,
    cleaned: Vec<CleanedRecord>,
    rows_ingested: usize,
    rows_dropped: usize,
    aggregates: Vec<RegionAggregate>,
}

impl PipelineExecutor {
    /// Create a new pipeline executor
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline.
    ///
    /// Stage failures do not escape: they short-circuit the remaining stages
    /// and come back inside the report with `status=failed`. Exactly one
    /// [RunSummary] row is appended to the run log in every case; an error is
    /// returned only when that append itself cannot be performed.
    pub fn run(&mut self) -> PipelineResult<PipelineReport> {
        let _span = info_span!("pipeline_run", run_date = %self.config.run_stamp()).entered();
        let start = Instant::now();

        info!(
            run_date = %self.config.run_stamp(),
            input = %self.config.input.display(),
            output_dir = %self.config.output_dir.display(),
            "Starting pipeline run"
        );
        if self.config.verbose {
            eprintln!("Pipeline run: {}", self.config.run_stamp());
            eprintln!("Input: {}", self.config.input.display());
        }

        let mut state = RunState::default();
        let mut outputs = HashMap::new();
        let mut completed = Vec::new();
        let outcome = self.execute_stages(&mut state, &mut outputs, &mut completed);

        let summary = match &outcome {
            Ok(()) => RunSummary::success(self.config.run_date, &state.cleaned),
            Err(e) => {
                error!(
                    stage = e.stage_name().unwrap_or("run"),
                    error = %e,
                    "Pipeline run failed"
                );
                if self.config.verbose {
                    eprintln!("Pipeline run failed: {e}");
                }
                RunSummary::failed(self.config.run_date)
            }
        };

        let log = RunLog::new(self.config.run_log_path());
        log.append(&summary)
            .map_err(|e| PipelineError::RunLog(e.to_string()))?;
        info!(
            status = %summary.status,
            rows_processed = summary.rows_processed,
            total_sales = summary.total_sales,
            unique_regions = summary.unique_regions,
            "Run summary appended"
        );

        let duration = start.elapsed();
        Ok(PipelineReport {
            run_date: self.config.run_date,
            status: summary.status,
            summary,
            stages_completed: completed,
            duration_ms: duration.as_millis() as u64,
            outputs,
            error: outcome.err().map(|e| e.to_string()),
        })
    }

    /// Run every stage in order, stopping at the first failure.
    fn execute_stages(
        &self,
        state: &mut RunState,
        outputs: &mut HashMap<String, StageOutput>,
        completed: &mut Vec<PipelineStage>,
    ) -> PipelineResult<()> {
        self.config.ensure_storage_layout()?;

        for stage in PipelineStage::all() {
            let _stage_span = info_span!("pipeline_stage", stage = stage.name()).entered();
            info!(
                stage = stage.name(),
                description = stage.description(),
                "Starting stage"
            );
            if self.config.verbose {
                eprintln!("Running stage {}...", stage.name());
            }

            let start = Instant::now();
            match self.run_stage(stage, state) {
                Ok(output) => {
                    let output = output.with_duration(start.elapsed().as_millis() as u64);
                    info!(
                        stage = stage.name(),
                        duration_ms = output.duration_ms,
                        "Stage completed"
                    );
                    if self.config.verbose {
                        eprintln!(
                            "Stage {} completed in {}ms",
                            stage.name(),
                            output.duration_ms
                        );
                    }
                    outputs.insert(stage.name().to_string(), output);
                    completed.push(stage);
                }
                Err(e) => {
                    let output =
                        StageOutput::failure().with_duration(start.elapsed().as_millis() as u64);
                    outputs.insert(stage.name().to_string(), output);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Run a single stage
    fn run_stage(&self, stage: PipelineStage, state: &mut RunState) -> PipelineResult<StageOutput> {
        match stage {
            PipelineStage::Ingest => self.run_ingest(state),
            PipelineStage::Clean => self.run_clean(state),
            PipelineStage::Persist => self.run_persist(state),
            PipelineStage::Aggregate => self.run_aggregate(state),
            PipelineStage::Chart => self.run_chart(state),
        }
    }

    fn run_ingest(&self, state: &mut RunState) -> PipelineResult<StageOutput> {
        state.raw = ingest::read_raw_records(&self.config.input)?;

        Ok(StageOutput::success()
            .with_metadata(
                "source",
                serde_json::json!(self.config.input.display().to_string()),
            )
            .with_metadata("rows_read", serde_json::json!(state.raw.len())))
    }

    fn run_clean(&self, state: &mut RunState) -> PipelineResult<StageOutput> {
        let outcome = clean::clean_records(std::mem::take(&mut state.raw))?;
        state.rows_ingested = outcome.rows_ingested;
        state.rows_dropped = outcome.rows_dropped;
        state.cleaned = outcome.records;

        Ok(StageOutput::success()
            .with_metadata("rows_ingested", serde_json::json!(state.rows_ingested))
            .with_metadata("rows_remaining", serde_json::json!(state.cleaned.len()))
            .with_metadata("rows_dropped", serde_json::json!(state.rows_dropped)))
    }

    fn run_persist(&self, state: &mut RunState) -> PipelineResult<StageOutput> {
        let path = self.config.database_path();
        let db = SalesDb::open(&path)?;
        db.init()?;
        db.replace_cleaned_sales(&state.cleaned)?;

        Ok(StageOutput::success()
            .with_file(&path)
            .with_metadata("rows_written", serde_json::json!(state.cleaned.len())))
    }

    fn run_aggregate(&self, state: &mut RunState) -> PipelineResult<StageOutput> {
        state.aggregates = aggregate::aggregate_by_region(&state.cleaned);
        let path = self.config.aggregate_path();
        aggregate::write_aggregate(&path, &state.aggregates)
            .map_err(|e| PipelineError::Aggregate(e.to_string()))?;

        Ok(StageOutput::success()
            .with_file(&path)
            .with_metadata("regions", serde_json::json!(state.aggregates.len())))
    }

    fn run_chart(&self, state: &mut RunState) -> PipelineResult<StageOutput> {
        let labels: Vec<String> = state.aggregates.iter().map(|a| a.region.clone()).collect();
        let values: Vec<f64> = state
            .aggregates
            .iter()
            .map(|a| a.total_sales_amount)
            .collect();
        let path = self.config.chart_path();
        chart::render_bar_chart(
            &labels,
            &values,
            &path,
            chart::CHART_WIDTH,
            chart::CHART_HEIGHT,
        )?;

        Ok(StageOutput::success().with_file(&path))
    }
}

/// Output from a pipeline stage
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// Whether the stage was successful
    pub success: bool,
    /// Stage duration in milliseconds
    pub duration_ms: u64,
    /// Files produced by this stage
    pub files: Vec<PathBuf>,
    /// Additional metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StageOutput {
    /// Create a successful stage output
    pub fn success() -> Self {
        Self {
            success: true,
            duration_ms: 0,
            files: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Create a failed stage output
    pub fn failure() -> Self {
        Self {
            success: false,
            ..Self::success()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Add a produced file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Report from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The run's identifying date
    pub run_date: NaiveDate,
    /// Final status
    pub status: RunStatus,
    /// The summary row appended to the run log
    pub summary: RunSummary,
    /// Stages that completed, in order
    pub stages_completed: Vec<PipelineStage>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Per-stage outputs
    pub outputs: HashMap<String, StageOutput>,
    /// Failure message, if any stage failed
    pub error: Option<String>,
}

impl PipelineReport {
    /// Check if the run was successful
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Pipeline run {} - {}", self.run_date, self.status);
        eprintln!("Duration: {}ms", self.duration_ms);
        eprintln!("Rows processed: {}", self.summary.rows_processed);
        eprintln!("Total sales: {:.2}", self.summary.total_sales);
        eprintln!("Regions: {}", self.summary.unique_regions);
        eprintln!("Stages completed: {}", self.stages_completed.len());

        for stage in &self.stages_completed {
            if let Some(output) = self.outputs.get(stage.name()) {
                eprintln!("  - {}: ok ({}ms)", stage.name(), output.duration_ms);
            }
        }

        if let Some(ref error) = self.error {
            eprintln!();
            eprintln!("Error: {error}");
        }
    }
}
