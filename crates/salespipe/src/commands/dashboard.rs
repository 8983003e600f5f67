//! CLI command rendering the dashboard from pipeline outputs
//!
//! Read-only: shows the run history with a total-sales trend chart, then the
//! most recent run's regional breakdown. Every missing artifact degrades to
//! a warning so the dashboard works from the very first (or a failed) run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use sales_pipeline_core::aggregate;
use sales_pipeline_core::chart;
use sales_pipeline_core::records::{RegionAggregate, RunSummary};
use sales_pipeline_core::runlog::{RUN_LOG_FILENAME, RunLog};

use crate::error::CliError;

/// Arguments for the `dashboard` command
#[derive(clap::Args)]
pub struct DashboardArgs {
    /// Directory the pipeline writes its outputs under
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Number of run-log rows to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Handle the `dashboard` command
pub fn handle_dashboard(args: &DashboardArgs) -> Result<(), CliError> {
    render_run_history(args)?;
    println!();
    render_latest_breakdown(args)?;
    Ok(())
}

fn render_run_history(args: &DashboardArgs) -> Result<(), CliError> {
    let log = RunLog::new(args.output_dir.join(RUN_LOG_FILENAME));
    if !log.path().exists() {
        warn!(log = %log.path().display(), "Run log not found");
        eprintln!("No {RUN_LOG_FILENAME} found yet. Run the pipeline first.");
        return Ok(());
    }

    let all = log
        .read_all()
        .map_err(|e| CliError::Dashboard(e.to_string()))?;
    let rows = log
        .tail(args.limit)
        .map_err(|e| CliError::Dashboard(e.to_string()))?;

    println!("Pipeline run summary (last {} of {})", rows.len(), all.len());
    print_run_rows(&rows);

    let values: Vec<f64> = all.iter().map(|r| r.total_sales).collect();
    let trend_path = args.output_dir.join("dashboard_trend.png");
    match chart::render_trend_chart(&values, &trend_path, chart::CHART_WIDTH, 320) {
        Ok(()) => eprintln!("Trend chart written to {}", trend_path.display()),
        Err(e) => eprintln!("Warning: could not render trend chart: {e}"),
    }

    Ok(())
}

fn render_latest_breakdown(args: &DashboardArgs) -> Result<(), CliError> {
    let Some(run_dir) = latest_run_dir(&args.output_dir) else {
        eprintln!("No run output folders found yet.");
        return Ok(());
    };
    let stamp = run_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!("Latest sales by region ({stamp})");

    let aggregate_path = run_dir.join(format!("sales_by_region_{stamp}.csv"));
    if !aggregate_path.exists() {
        warn!(file = %aggregate_path.display(), "Aggregate file not found");
        eprintln!("No regional sales file found for {stamp}.");
        return Ok(());
    }

    let rows = aggregate::read_aggregate(&aggregate_path)
        .map_err(|e| CliError::Dashboard(e.to_string()))?;
    print_region_rows(&rows);

    let labels: Vec<String> = rows.iter().map(|r| r.region.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.total_sales_amount).collect();
    let regions_path = args.output_dir.join("dashboard_regions.png");
    match chart::render_bar_chart(
        &labels,
        &values,
        &regions_path,
        chart::CHART_WIDTH,
        chart::CHART_HEIGHT,
    ) {
        Ok(()) => eprintln!("Region chart written to {}", regions_path.display()),
        Err(e) => eprintln!("Warning: could not render region chart: {e}"),
    }

    Ok(())
}

fn print_run_rows(rows: &[RunSummary]) {
    println!(
        "{:<12} {:>14} {:>12} {:>14} {:>8}",
        "run_date", "rows_processed", "total_sales", "unique_regions", "status"
    );
    for row in rows {
        println!(
            "{:<12} {:>14} {:>12.2} {:>14} {:>8}",
            row.run_date.to_string(),
            row.rows_processed,
            row.total_sales,
            row.unique_regions,
            row.status.to_string()
        );
    }
}

fn print_region_rows(rows: &[RegionAggregate]) {
    println!(
        "{:<16} {:>18} {:>12} {:>16}",
        "region", "total_sales_amount", "total_orders", "avg_order_value"
    );
    for row in rows {
        println!(
            "{:<16} {:>18.2} {:>12} {:>16.2}",
            row.region, row.total_sales_amount, row.total_orders, row.avg_order_value
        );
    }
}

/// Most recent run directory under the output directory, by name.
///
/// Run directories are date-stamped, so lexicographic order is
/// chronological order.
fn latest_run_dir(output_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(output_dir).ok()?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs.pop()
}
