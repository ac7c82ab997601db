use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub total_amount: f64,
}

/// Daily totals for one category, ascending by date.
///
/// Returns an empty series when nothing matches; forecasting callers turn
/// that into `SwiftError::EmptyCategory`.
pub fn aggregate(transactions: &[Transaction], category: &str) -> Vec<TimeSeriesPoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in transactions.iter().filter(|t| t.category == category) {
        *by_day.entry(txn.date).or_insert(0.0) += txn.amount;
    }
    by_day
        .into_iter()
        .map(|(date, total_amount)| TimeSeriesPoint { date, total_amount })
        .collect()
}
