//! Validation, type coercion, and derived fields
//!
//! Rows with missing fields or an unparseable date are dropped silently and
//! only counted. A kept row whose quantity or price fails numeric coercion is
//! a defect in the extract and fails the stage. Callers must not collapse the
//! two cases into one another.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::records::{CleanedRecord, RawRecord};

/// Accepted date representations, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Errors raised when a kept row has an unconvertible numeric field
#[derive(Error, Debug)]
pub enum CoercionError {
    /// quantity is not an integer (or integral float)
    #[error("order {order_id}: quantity '{value}' is not numeric")]
    InvalidQuantity { order_id: String, value: String },

    /// price is not a decimal number
    #[error("order {order_id}: price '{value}' is not numeric")]
    InvalidPrice { order_id: String, value: String },
}

/// Result of the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// Rows that survived filtering, fully typed and augmented
    pub records: Vec<CleanedRecord>,
    /// Raw rows that entered the stage
    pub rows_ingested: usize,
    /// Rows dropped by filtering (missing fields or unparseable date)
    pub rows_dropped: usize,
}

/// Clean and transform raw rows into [CleanedRecord]s.
///
/// Emits one informational event with the rows-in/rows-remaining counts;
/// dropped rows produce no per-row diagnostics.
pub fn clean_records(raw: Vec<RawRecord>) -> Result<CleanOutcome, CoercionError> {
    let rows_ingested = raw.len();
    let mut records = Vec::with_capacity(rows_ingested);

    for row in &raw {
        let (Some(order_id), Some(date_raw), Some(region), Some(quantity_raw), Some(price_raw)) = (
            present(&row.order_id),
            present(&row.date),
            present(&row.region),
            present(&row.quantity),
            present(&row.price),
        ) else {
            continue;
        };
        let Some(date) = parse_date(date_raw) else {
            continue;
        };

        let quantity =
            parse_quantity(quantity_raw).ok_or_else(|| CoercionError::InvalidQuantity {
                order_id: order_id.to_string(),
                value: quantity_raw.to_string(),
            })?;
        let price: f64 = price_raw.parse().map_err(|_| CoercionError::InvalidPrice {
            order_id: order_id.to_string(),
            value: price_raw.to_string(),
        })?;

        let total_amount = quantity as f64 * price;
        let month = date.format("%Y-%m").to_string();

        records.push(CleanedRecord {
            order_id: order_id.to_string(),
            date,
            region: region.to_string(),
            quantity,
            price,
            total_amount,
            month,
        });
    }

    let rows_dropped = rows_ingested - records.len();
    info!(
        rows_ingested,
        rows_remaining = records.len(),
        rows_dropped,
        "Cleaned input rows"
    );

    Ok(CleanOutcome {
        records,
        rows_ingested,
        rows_dropped,
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// Integral floats ("2.0") coerce by truncation; anything non-numeric is None.
fn parse_quantity(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(order_id: &str, date: &str, region: &str, quantity: &str, price: &str) -> RawRecord {
        let field = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        RawRecord {
            order_id: field(order_id),
            date: field(date),
            region: field(region),
            quantity: field(quantity),
            price: field(price),
        }
    }

    #[test]
    fn test_keeps_complete_rows_and_derives_fields() {
        let outcome = clean_records(vec![raw("1", "2024-01-15", "East", "2", "10.0")])
            .expect("clean should succeed");

        assert_eq!(outcome.rows_ingested, 1);
        assert_eq!(outcome.rows_dropped, 0);
        let record = &outcome.records[0];
        assert_eq!(record.quantity, 2);
        assert_eq!(record.price, 10.0);
        assert_eq!(record.total_amount, 20.0);
        assert_eq!(record.month, "2024-01");
    }

    #[test]
    fn test_drops_rows_with_missing_fields() {
        let outcome = clean_records(vec![
            raw("1", "2024-01-01", "East", "2", "10.0"),
            raw("2", "2024-01-01", "", "1", "5.0"),
            raw("", "2024-01-01", "West", "1", "5.0"),
            raw("4", "", "West", "1", "5.0"),
        ])
        .expect("missing fields never fail the stage");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.rows_dropped, 3);
    }

    #[test]
    fn test_drops_rows_with_unparseable_dates() {
        let outcome = clean_records(vec![
            raw("1", "2024-01-01", "East", "2", "10.0"),
            raw("2", "bad-date", "West", "1", "5.0"),
        ])
        .expect("bad dates never fail the stage");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].region, "East");
    }

    #[test]
    fn test_filtering_never_adds_rows() {
        let rows: Vec<RawRecord> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    raw(&i.to_string(), "not-a-date", "East", "1", "1.0")
                } else {
                    raw(&i.to_string(), "2024-02-01", "East", "1", "1.0")
                }
            })
            .collect();
        let total = rows.len();

        let outcome = clean_records(rows).expect("clean should succeed");
        assert!(outcome.records.len() <= total);
        assert_eq!(outcome.rows_ingested, total);
    }

    #[test]
    fn test_bad_quantity_on_kept_row_fails_stage() {
        let err = clean_records(vec![raw("1", "2024-01-01", "East", "two", "10.0")])
            .expect_err("non-numeric quantity must raise");
        assert!(matches!(err, CoercionError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_bad_price_on_kept_row_fails_stage() {
        let err = clean_records(vec![raw("1", "2024-01-01", "East", "2", "$10")])
            .expect_err("non-numeric price must raise");
        assert!(matches!(err, CoercionError::InvalidPrice { .. }));
    }

    #[test]
    fn test_integral_float_quantity_truncates() {
        let outcome =
            clean_records(vec![raw("1", "2024-01-01", "East", "2.0", "10.0")]).expect("clean");
        assert_eq!(outcome.records[0].quantity, 2);
    }

    #[test]
    fn test_alternate_date_formats() {
        let outcome = clean_records(vec![
            raw("1", "2024/01/05", "East", "1", "1.0"),
            raw("2", "01/06/2024", "West", "1", "1.0"),
        ])
        .expect("clean");

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].month, "2024-01");
        assert_eq!(outcome.records[1].month, "2024-01");
    }

    #[test]
    fn test_empty_input_is_empty_outcome() {
        let outcome = clean_records(Vec::new()).expect("clean");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rows_ingested, 0);
        assert_eq!(outcome.rows_dropped, 0);
    }
}
