//! Row types flowing through the pipeline stages

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw input row, exactly as read from the CSV extract.
///
/// Every field is optional: missing columns and empty cells both arrive as
/// `None` and are handled by the cleaning stage, never here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    /// Order identifier
    pub order_id: Option<String>,
    /// Sale date, unparsed
    pub date: Option<String>,
    /// Sales region
    pub region: Option<String>,
    /// Ordered quantity, unparsed
    pub quantity: Option<String>,
    /// Unit price, unparsed
    pub price: Option<String>,
}

/// A validated, type-coerced row with derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    /// Order identifier
    pub order_id: String,
    /// Sale date
    pub date: NaiveDate,
    /// Sales region
    pub region: String,
    /// Ordered quantity
    pub quantity: i64,
    /// Unit price
    pub price: f64,
    /// quantity * price
    pub total_amount: f64,
    /// Sale month as "YYYY-MM"
    pub month: String,
}

/// One row of the region-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    /// Sales region
    pub region: String,
    /// Sum of total_amount over the region's records
    pub total_sales_amount: f64,
    /// Number of records in the region
    pub total_orders: u64,
    /// Mean total_amount over the region's records
    pub avg_order_value: f64,
}

/// Final status of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// All stages completed
    Success,
    /// A stage failed; remaining stages were skipped
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One row of the append-only run log, summarising a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Calendar date identifying the run
    pub run_date: NaiveDate,
    /// Count of cleaned records (0 on failure)
    pub rows_processed: u64,
    /// Sum of total_amount, rounded to 2 decimal places (0 on failure)
    pub total_sales: f64,
    /// Distinct region count (0 on failure)
    pub unique_regions: u64,
    /// Run outcome
    pub status: RunStatus,
}

impl RunSummary {
    /// Summary for a successful run, derived from the final cleaned set.
    pub fn success(run_date: NaiveDate, records: &[CleanedRecord]) -> Self {
        let total: f64 = records.iter().map(|r| r.total_amount).sum();
        let regions: HashSet<&str> = records.iter().map(|r| r.region.as_str()).collect();
        Self {
            run_date,
            rows_processed: records.len() as u64,
            total_sales: round2(total),
            unique_regions: regions.len() as u64,
            status: RunStatus::Success,
        }
    }

    /// Summary for a failed run: all counters reduce to the failure defaults.
    pub fn failed(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            rows_processed: 0,
            total_sales: 0.0,
            unique_regions: 0,
            status: RunStatus::Failed,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
