//! Integration tests for the full run engine:
//! ingest → clean → persist → aggregate → chart → run log

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use sales_pipeline_core::aggregate;
use sales_pipeline_core::pipeline::{PipelineConfig, PipelineExecutor};
use sales_pipeline_core::records::RunStatus;
use sales_pipeline_core::runlog::RunLog;
use sales_pipeline_core::store::SalesDb;

const SAMPLE: &str =
    "order_id,date,region,quantity,price\n1,2024-01-01,East,2,10.0\n2,bad-date,West,1,5.0\n";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
}

fn write_input(temp: &TempDir, contents: &str) -> PathBuf {
    let path = temp.path().join("raw_sales.csv");
    fs::write(&path, contents).expect("write input csv");
    path
}

fn config_for(temp: &TempDir, input: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_input(input)
        .with_output_dir(temp.path().join("output"))
        .with_run_date(run_date())
}

fn run(config: PipelineConfig) -> sales_pipeline_core::PipelineReport {
    let mut executor = PipelineExecutor::new(config).expect("executor");
    executor.run().expect("run returns a report")
}

#[test]
fn test_two_row_example_end_to_end() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(&temp, SAMPLE);
    let config = config_for(&temp, &input);
    let agg_path = config.aggregate_path();
    let chart_path = config.chart_path();
    let db_path = config.database_path();
    let log_path = config.run_log_path();

    let report = run(config);

    assert!(report.is_success());
    assert_eq!(report.summary.rows_processed, 1);
    assert_eq!(report.summary.total_sales, 20.0);
    assert_eq!(report.summary.unique_regions, 1);

    // Aggregate: exactly one row for East
    let rows = aggregate::read_aggregate(&agg_path).expect("read aggregate");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].region, "East");
    assert_eq!(rows[0].total_sales_amount, 20.0);
    assert_eq!(rows[0].total_orders, 1);
    assert_eq!(rows[0].avg_order_value, 20.0);

    // Chart artifact exists
    assert!(chart_path.exists());

    // Store holds exactly the cleaned rows
    let db = SalesDb::open(&db_path).expect("open store");
    assert_eq!(db.cleaned_count().expect("count"), 1);

    // Run log gained exactly one success row
    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunStatus::Success);
    assert_eq!(entries[0].rows_processed, 1);
    assert_eq!(entries[0].total_sales, 20.0);
    assert_eq!(entries[0].unique_regions, 1);
}

#[test]
fn test_missing_input_still_logs_failed_run() {
    let temp = TempDir::new().expect("temp dir");
    let config = config_for(&temp, &temp.path().join("does-not-exist.csv"));
    let agg_path = config.aggregate_path();
    let chart_path = config.chart_path();
    let log_path = config.run_log_path();

    let report = run(config);

    assert!(!report.is_success());
    assert_eq!(report.summary.status, RunStatus::Failed);

    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunStatus::Failed);
    assert_eq!(entries[0].rows_processed, 0);
    assert_eq!(entries[0].total_sales, 0.0);
    assert_eq!(entries[0].unique_regions, 0);

    // No run artifacts were produced
    assert!(!agg_path.exists());
    assert!(!chart_path.exists());
}

#[test]
fn test_coercion_failure_logs_failed_run() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(
        &temp,
        "order_id,date,region,quantity,price\n1,2024-01-01,East,two,10.0\n",
    );
    let config = config_for(&temp, &input);
    let agg_path = config.aggregate_path();
    let log_path = config.run_log_path();

    let report = run(config);

    assert!(!report.is_success());
    assert!(report.error.expect("failure message").contains("quantity"));

    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunStatus::Failed);
    assert_eq!(entries[0].rows_processed, 0);

    assert!(!agg_path.exists());
}

#[test]
fn test_chart_failure_logs_failed_run_but_keeps_earlier_artifacts() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(&temp, SAMPLE);
    let config = config_for(&temp, &input);
    let agg_path = config.aggregate_path();
    let chart_path = config.chart_path();
    let log_path = config.run_log_path();

    // A directory squatting on the chart path makes the PNG save fail
    fs::create_dir_all(&chart_path).expect("block chart path");

    let report = run(config);

    assert!(!report.is_success());
    assert_eq!(report.stages_completed.len(), 4);
    assert!(report.error.expect("failure message").contains("Chart"));

    // Stages before the failure already wrote their artifacts
    assert!(agg_path.exists());

    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunStatus::Failed);
    assert_eq!(entries[0].rows_processed, 0);
}

#[test]
fn test_run_log_grows_by_one_per_invocation_without_rewrites() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(&temp, SAMPLE);
    let log_path = config_for(&temp, &input).run_log_path();

    let mut prior = Vec::new();
    for i in 1..=3 {
        // Mix in a failed invocation to cover both outcomes
        let config = if i == 2 {
            config_for(&temp, &temp.path().join("missing.csv"))
        } else {
            config_for(&temp, &input)
        };
        run(config);

        let bytes = fs::read(&log_path).expect("read log bytes");
        assert!(bytes.starts_with(&prior), "prior rows must never change");
        prior = bytes;

        let entries = RunLog::new(&log_path).read_all().expect("read log");
        assert_eq!(entries.len(), i);
    }
}

#[test]
fn test_rerun_is_byte_identical_for_aggregate_and_appends_new_log_rows() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(&temp, SAMPLE);

    let config = config_for(&temp, &input);
    let agg_path = config.aggregate_path();
    run(config);
    let first = fs::read(&agg_path).expect("first aggregate");

    let config = config_for(&temp, &input);
    let log_path = config.run_log_path();
    run(config);
    let second = fs::read(&agg_path).expect("second aggregate");

    assert_eq!(first, second);

    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].run_date, entries[1].run_date);
}

#[test]
fn test_reused_store_location_is_fully_replaced() {
    let temp = TempDir::new().expect("temp dir");
    let shared_db = temp.path().join("shared.duckdb");

    let input = write_input(
        &temp,
        "order_id,date,region,quantity,price\n1,2024-01-01,East,2,10.0\n2,2024-01-02,West,1,5.0\n",
    );
    run(config_for(&temp, &input).with_database(&shared_db));

    let input = write_input(&temp, "order_id,date,region,quantity,price\n3,2024-01-03,North,1,7.0\n");
    run(config_for(&temp, &input).with_database(&shared_db));

    let db = SalesDb::open(&shared_db).expect("open store");
    assert_eq!(db.cleaned_count().expect("count"), 1);
}

#[test]
fn test_empty_input_succeeds_with_empty_aggregate() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(&temp, "order_id,date,region,quantity,price\n");
    let config = config_for(&temp, &input);
    let agg_path = config.aggregate_path();
    let log_path = config.run_log_path();

    let report = run(config);

    assert!(report.is_success());
    assert_eq!(report.summary.rows_processed, 0);
    assert!(aggregate::read_aggregate(&agg_path).expect("read").is_empty());

    let entries = RunLog::new(log_path).read_all().expect("read log");
    assert_eq!(entries[0].status, RunStatus::Success);
    assert_eq!(entries[0].rows_processed, 0);
}
