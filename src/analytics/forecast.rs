use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::aggregate::TimeSeriesPoint;
use super::svr::{Svr, SvrParams};
use crate::error::{Result, SwiftError};

/// Regression hyperparameters. Fixed so forecasts stay comparable.
pub const SVR_PARAMS: SvrParams = SvrParams {
    c: 100.0,
    gamma: 0.1,
    epsilon: 0.1,
    tol: 1e-3,
};

pub const HORIZON: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub existing_dates: Vec<NaiveDate>,
    pub existing_predictions: Vec<f64>,
    pub future_dates: Vec<NaiveDate>,
    pub future_predictions: Vec<f64>,
}

/// Day number with 0001-01-01 as day 1.
pub fn ordinal(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// `periods` consecutive month ends, the first one strictly after `last`.
pub fn month_ends_after(last: NaiveDate, periods: usize) -> Result<Vec<NaiveDate>> {
    let out_of_range = || SwiftError::Other(format!("Forecast horizon out of range after {last}"));
    let mut current = end_of_month(last).ok_or_else(out_of_range)?;
    if current <= last {
        current = end_of_month(last.succ_opt().ok_or_else(out_of_range)?).ok_or_else(out_of_range)?;
    }
    let mut dates = Vec::with_capacity(periods);
    for _ in 0..periods {
        dates.push(current);
        let next_day = current.succ_opt().ok_or_else(out_of_range)?;
        current = end_of_month(next_day).ok_or_else(out_of_range)?;
    }
    Ok(dates)
}

/// Fit the series and predict it back plus [`HORIZON`] month ends ahead.
pub fn forecast(series: &[TimeSeriesPoint]) -> Result<ForecastResult> {
    let distinct_dates = series.iter().map(|p| p.date).collect::<BTreeSet<_>>().len();
    if series.len() < 2 || distinct_dates < 2 {
        return Err(SwiftError::InsufficientData { distinct_dates });
    }

    let x: Vec<f64> = series.iter().map(|p| ordinal(p.date)).collect();
    let y: Vec<f64> = series.iter().map(|p| p.total_amount).collect();
    let model = Svr::fit(&x, &y, &SVR_PARAMS);

    let existing_dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    let existing_predictions = x.iter().map(|&xi| model.predict(xi)).collect();

    let last = existing_dates.iter().max().copied().unwrap_or(existing_dates[0]);
    let future_dates = month_ends_after(last, HORIZON)?;
    let future_predictions = future_dates
        .iter()
        .map(|&d| model.predict(ordinal(d)))
        .collect();

    debug!(
        points = series.len(),
        support_vectors = model.n_support(),
        iterations = model.iterations(),
        "Forecast computed"
    );

    Ok(ForecastResult {
        existing_dates,
        existing_predictions,
        future_dates,
        future_predictions,
    })
}

/// Forecast the aggregated series of one category. An empty category is an
/// error, never an empty result.
pub fn forecast_series(series: &[TimeSeriesPoint], category: &str) -> Result<ForecastResult> {
    if series.is_empty() {
        return Err(SwiftError::EmptyCategory(category.to_string()));
    }
    forecast(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate::aggregate;
    use crate::analytics::test_support::{date, txn};
    use crate::models::Transaction;

    fn point(d: &str, total_amount: f64) -> TimeSeriesPoint {
        TimeSeriesPoint { date: date(d), total_amount }
    }

    #[test]
    fn test_ordinal_matches_proleptic_day_count() {
        assert_eq!(ordinal(date("0001-01-01")), 1.0);
        assert_eq!(ordinal(date("2024-01-01")), 738_886.0);
        assert_eq!(ordinal(date("2024-02-01")) - ordinal(date("2024-01-01")), 31.0);
    }

    #[test]
    fn test_month_ends_after_mid_month() {
        let dates = month_ends_after(date("2024-01-15"), 5).unwrap();
        assert_eq!(
            dates,
            vec![
                date("2024-01-31"),
                date("2024-02-29"),
                date("2024-03-31"),
                date("2024-04-30"),
                date("2024-05-31"),
            ]
        );
    }

    #[test]
    fn test_month_ends_skip_last_date_when_already_month_end() {
        let dates = month_ends_after(date("2023-12-31"), 2).unwrap();
        assert_eq!(dates, vec![date("2024-01-31"), date("2024-02-29")]);
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let err = forecast(&[point("2024-01-01", 150.0)]).unwrap_err();
        assert!(matches!(err, SwiftError::InsufficientData { distinct_dates: 1 }));
    }

    #[test]
    fn test_repeated_date_is_insufficient() {
        let err = forecast(&[point("2024-01-01", 150.0), point("2024-01-01", 20.0)]).unwrap_err();
        assert!(matches!(err, SwiftError::InsufficientData { distinct_dates: 1 }));
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let err = forecast(&[]).unwrap_err();
        assert!(matches!(err, SwiftError::InsufficientData { distinct_dates: 0 }));
    }

    #[test]
    fn test_horizon_shape() {
        let series = vec![point("2024-01-01", 150.0), point("2024-02-01", 30.0)];
        let result = forecast(&series).unwrap();

        assert_eq!(result.existing_dates, vec![date("2024-01-01"), date("2024-02-01")]);
        assert_eq!(result.existing_predictions.len(), 2);
        assert_eq!(result.future_dates.len(), HORIZON);
        assert_eq!(result.future_predictions.len(), HORIZON);
        assert!(result.future_dates[0] > date("2024-02-01"));
        for pair in result.future_dates.windows(2) {
            let gap = (pair[1] - pair[0]).num_days();
            assert!((28..=31).contains(&gap), "gap of {gap} days");
        }
    }

    #[test]
    fn test_predictions_are_smoothed_fit_not_raw_values() {
        let series = vec![point("2024-01-01", 150.0), point("2024-02-01", 30.0)];
        let result = forecast(&series).unwrap();
        // Within the epsilon tube of each observation.
        assert!((result.existing_predictions[0] - 150.0).abs() <= 0.11);
        assert!((result.existing_predictions[1] - 30.0).abs() <= 0.11);
        assert_ne!(result.existing_predictions[0], 150.0);
        // Far from the data the model falls back to its intercept.
        for p in &result.future_predictions {
            assert!((p - 90.0).abs() < 0.05, "future prediction {p}");
        }
    }

    fn forecast_category(txns: &[Transaction], category: &str) -> Result<ForecastResult> {
        forecast_series(&aggregate(txns, category), category)
    }

    #[test]
    fn test_forecast_category_end_to_end() {
        let txns = vec![
            txn(1, "Housing", 100.0, "2024-01-01"),
            txn(2, "Housing", 50.0, "2024-01-01"),
            txn(3, "Housing", 30.0, "2024-02-01"),
            txn(4, "Healthcare", 80.0, "2024-03-01"),
        ];
        let result = forecast_category(&txns, "Housing").unwrap();
        assert_eq!(result.existing_dates.len(), 2);
        assert_eq!(result.future_dates[0], date("2024-02-29"));
    }

    #[test]
    fn test_forecast_category_empty_is_distinct_error() {
        let txns = vec![txn(1, "Housing", 100.0, "2024-01-01")];
        let err = forecast_category(&txns, "Healthcare").unwrap_err();
        assert!(matches!(err, SwiftError::EmptyCategory(ref c) if c == "Healthcare"));
    }

    #[test]
    fn test_forecast_category_one_day_is_insufficient() {
        let txns = vec![
            txn(1, "Housing", 100.0, "2024-01-01"),
            txn(2, "Housing", 50.0, "2024-01-01"),
        ];
        let err = forecast_category(&txns, "Housing").unwrap_err();
        assert!(matches!(err, SwiftError::InsufficientData { .. }));
    }
}
