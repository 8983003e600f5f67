//! Pipeline configuration types

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::runlog::RUN_LOG_FILENAME;

/// Main pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the raw sales CSV extract
    pub input: PathBuf,
    /// Directory all outputs are written under
    pub output_dir: PathBuf,
    /// Store location override; defaults to a run-scoped path
    pub database: Option<PathBuf>,
    /// Calendar date identifying this run
    pub run_date: NaiveDate,
    /// Mirror stage progress to stderr
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw_sales.csv"),
            output_dir: PathBuf::from("output"),
            database: None,
            run_date: Local::now().date_naive(),
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input CSV path
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = path.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Override the store location (reused across runs instead of run-scoped)
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Set the run date
    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The run's date stamp, used to namespace artifacts
    pub fn run_stamp(&self) -> String {
        self.run_date.format("%Y-%m-%d").to_string()
    }

    /// Directory holding this run's artifacts
    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(self.run_stamp())
    }

    /// Effective store path for this run
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| self.run_dir().join("sales.duckdb"))
    }

    /// Versioned aggregate file path for this run
    pub fn aggregate_path(&self) -> PathBuf {
        self.run_dir()
            .join(format!("sales_by_region_{}.csv", self.run_stamp()))
    }

    /// Versioned chart path for this run
    pub fn chart_path(&self) -> PathBuf {
        self.run_dir()
            .join(format!("sales_by_region_{}.png", self.run_stamp()))
    }

    /// Fixed run log path shared by every run under this output directory
    pub fn run_log_path(&self) -> PathBuf {
        self.output_dir.join(RUN_LOG_FILENAME)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("Input path is required".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory is required".to_string());
        }
        Ok(())
    }

    /// Ensure the output directory layout exists. Idempotent; invoked at the
    /// start of every run rather than at process start.
    pub fn ensure_storage_layout(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(self.run_dir())?;
        if let Some(parent) = self.database_path().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Stage 1: Read the raw CSV extract into memory
    Ingest,
    /// Stage 2: Validate, coerce, and derive fields
    Clean,
    /// Stage 3: Replace the cleaned_sales table in the store
    Persist,
    /// Stage 4: Group by region and write the versioned aggregate file
    Aggregate,
    /// Stage 5: Render the region bar chart
    Chart,
}

impl PipelineStage {
    /// Get all stages in execution order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Ingest,
            Self::Clean,
            Self::Persist,
            Self::Aggregate,
            Self::Chart,
        ]
    }

    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Clean => "clean",
            Self::Persist => "persist",
            Self::Aggregate => "aggregate",
            Self::Chart => "chart",
        }
    }

    /// Get stage description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ingest => "Read the raw CSV extract",
            Self::Clean => "Validate, coerce, and derive fields",
            Self::Persist => "Replace the cleaned_sales table",
            Self::Aggregate => "Summarise sales by region",
            Self::Chart => "Render the region bar chart",
        }
    }

    /// Get stage index (1-based)
    pub fn index(&self) -> usize {
        match self {
            Self::Ingest => 1,
            Self::Clean => 2,
            Self::Persist => 3,
            Self::Aggregate => 4,
            Self::Chart => 5,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
