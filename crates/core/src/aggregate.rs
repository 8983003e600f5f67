//! Region-level aggregation and its versioned CSV export

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::records::{CleanedRecord, RegionAggregate};

/// Column order of the aggregate file, used when writing an empty result.
const AGGREGATE_HEADER: [&str; 4] = [
    "region",
    "total_sales_amount",
    "total_orders",
    "avg_order_value",
];

/// Group cleaned records by region and summarise each group.
///
/// Rows come back sorted descending by `total_sales_amount`; ties keep the
/// order regions first appeared in the input. Empty input yields no rows.
pub fn aggregate_by_region(records: &[CleanedRecord]) -> Vec<RegionAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64, u64)> = Vec::new();

    for record in records {
        match index.get(record.region.as_str()) {
            Some(&i) => {
                totals[i].1 += record.total_amount;
                totals[i].2 += 1;
            }
            None => {
                index.insert(record.region.as_str(), totals.len());
                totals.push((record.region.clone(), record.total_amount, 1));
            }
        }
    }

    let mut rows: Vec<RegionAggregate> = totals
        .into_iter()
        .map(|(region, total, count)| RegionAggregate {
            region,
            total_sales_amount: total,
            total_orders: count,
            avg_order_value: total / count as f64,
        })
        .collect();

    // stable sort: equal totals keep first-seen region order
    rows.sort_by(|a, b| {
        b.total_sales_amount
            .partial_cmp(&a.total_sales_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// Write the aggregate rows to `path`, header included even when empty.
pub fn write_aggregate(path: &Path, rows: &[RegionAggregate]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(AGGREGATE_HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!(rows = rows.len(), file = %path.display(), "Wrote aggregate file");
    Ok(())
}

/// Read an aggregate file back (viewer path).
pub fn read_aggregate(path: &Path) -> Result<Vec<RegionAggregate>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize().collect()
}
