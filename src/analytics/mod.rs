//! Expense analytics: daily aggregation, spend forecasting and clustering.
//!
//! Everything here is a pure function of a ledger snapshot. [`Engine`] only
//! binds those functions to a [`Ledger`] and an explicit [`RequestContext`].

pub mod aggregate;
pub mod cluster;
pub mod encode;
pub mod forecast;
pub mod kmeans;
pub mod svr;

pub use aggregate::{aggregate, TimeSeriesPoint};
pub use cluster::{cluster, ClusterAssignment, ClusterCount, ClusterOptions, FeatureSelector};
pub use forecast::ForecastResult;

use tracing::info;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{RequestContext, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub cluster: ClusterOptions,
}

/// A forecast together with the daily series it was fitted on.
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub series: Vec<TimeSeriesPoint>,
    pub forecast: ForecastResult,
}

/// Cluster assignments together with the transactions they label, in order.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub transactions: Vec<Transaction>,
    pub assignments: Vec<ClusterAssignment>,
}

pub struct Engine<L> {
    ledger: L,
    config: EngineConfig,
}

impl<L: Ledger> Engine<L> {
    pub fn new(ledger: L, config: EngineConfig) -> Self {
        Self { ledger, config }
    }

    pub fn daily_series(&self, ctx: &RequestContext, category: &str) -> Result<Vec<TimeSeriesPoint>> {
        let txns = self.ledger.get_transactions(&ctx.owner)?;
        Ok(aggregate(&txns, category))
    }

    pub fn forecast(&self, ctx: &RequestContext, category: &str) -> Result<ForecastReport> {
        let series = self.daily_series(ctx, category)?;
        let forecast = forecast::forecast_series(&series, category)?;
        info!(owner = %ctx.owner, category, points = series.len(), "Forecast ready");
        Ok(ForecastReport { series, forecast })
    }

    pub fn cluster(&self, ctx: &RequestContext, selector: FeatureSelector) -> Result<ClusterReport> {
        let transactions = self.ledger.get_transactions(&ctx.owner)?;
        let assignments = cluster(&transactions, selector, &self.config.cluster)?;
        info!(owner = %ctx.owner, %selector, transactions = assignments.len(), "Clusters ready");
        Ok(ClusterReport {
            transactions,
            assignments,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::error::Result;
    use crate::ledger::Ledger;
    use crate::models::Transaction;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn txn(id: i64, category: &str, amount: f64, day: &str) -> Transaction {
        Transaction {
            id,
            owner: "ann".to_string(),
            name: format!("expense {id}"),
            category: category.to_string(),
            amount,
            date: date(day),
        }
    }

    pub struct MemoryLedger(pub Vec<Transaction>);

    impl Ledger for MemoryLedger {
        fn get_transactions(&self, owner: &str) -> Result<Vec<Transaction>> {
            Ok(self.0.iter().filter(|t| t.owner == owner).cloned().collect())
        }
    }
}
