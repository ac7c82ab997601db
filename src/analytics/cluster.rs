use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::encode::encode;
use super::kmeans;
use crate::error::{Result, SwiftError};
use crate::ledger::DATE_FORMAT;
use crate::models::Transaction;

const N_INIT: usize = 10;

/// Which single column drives the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSelector {
    Category,
    Date,
    Amount,
}

impl FromStr for FeatureSelector {
    type Err = SwiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" | "categories" => Ok(Self::Category),
            "date" | "dates" => Ok(Self::Date),
            "amount" | "amounts" => Ok(Self::Amount),
            _ => Err(SwiftError::UnknownFeatureSelector(s.to_string())),
        }
    }
}

impl fmt::Display for FeatureSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Category => "Category",
            Self::Date => "Date",
            Self::Amount => "Amount",
        };
        f.write_str(name)
    }
}

/// How many clusters to ask k-means for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterCount {
    /// One cluster per transaction. Kept as the default for compatibility
    /// with earlier releases; it labels every distinct row separately.
    #[default]
    PerTransaction,
    /// `round(sqrt(n / 2))`, at least 1.
    Auto,
    Fixed(usize),
}

impl ClusterCount {
    pub fn resolve(self, n: usize) -> Result<usize> {
        match self {
            Self::PerTransaction => Ok(n),
            Self::Auto => Ok(((n as f64 / 2.0).sqrt().round() as usize).clamp(1, n)),
            Self::Fixed(0) => Err(SwiftError::InvalidClusterCount(0)),
            Self::Fixed(k) if k > n => {
                warn!(requested = k, transactions = n, "Cluster count exceeds transactions, using {n}");
                Ok(n)
            }
            Self::Fixed(k) => Ok(k),
        }
    }
}

impl FromStr for ClusterCount {
    type Err = SwiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "per-transaction" | "per_transaction" => Ok(Self::PerTransaction),
            "auto" => Ok(Self::Auto),
            other => other
                .parse::<usize>()
                .map(Self::Fixed)
                .map_err(|_| SwiftError::Settings(format!("invalid cluster count: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    pub count: ClusterCount,
    pub seed: u64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            count: ClusterCount::default(),
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    pub transaction_id: i64,
    pub feature_value: f64,
    pub cluster_label: usize,
}

/// The numeric column for `selector`: category code, date code or amount.
pub fn feature_column(transactions: &[Transaction], selector: FeatureSelector) -> Vec<f64> {
    match selector {
        FeatureSelector::Category => {
            let codes = encode(transactions.iter().map(|t| t.category.as_str()));
            debug!(distinct = codes.len(), "Encoded categories");
            transactions
                .iter()
                .map(|t| codes.code(&t.category).unwrap_or_default() as f64)
                .collect()
        }
        FeatureSelector::Date => {
            let days: Vec<String> = transactions
                .iter()
                .map(|t| t.date.format(DATE_FORMAT).to_string())
                .collect();
            let codes = encode(&days);
            debug!(distinct = codes.len(), "Encoded dates");
            days.iter()
                .map(|d| codes.code(d).unwrap_or_default() as f64)
                .collect()
        }
        FeatureSelector::Amount => transactions.iter().map(|t| t.amount).collect(),
    }
}

/// Relabel so clusters are numbered by first appearance in input order.
fn canonical_labels(labels: &[usize]) -> Vec<usize> {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&l| {
            let next = seen.len();
            *seen.entry(l).or_insert(next)
        })
        .collect()
}

pub fn cluster(
    transactions: &[Transaction],
    selector: FeatureSelector,
    options: &ClusterOptions,
) -> Result<Vec<ClusterAssignment>> {
    if transactions.is_empty() {
        return Err(SwiftError::EmptyClusterInput);
    }
    let n = transactions.len();
    let k = options.count.resolve(n)?;
    if options.count == ClusterCount::PerTransaction && n > 1 {
        warn!(
            transactions = n,
            "Clustering with one cluster per transaction; pass --clusters auto or a count for a meaningful grouping"
        );
    }

    let features = feature_column(transactions, selector);
    let mut rng = StdRng::seed_from_u64(options.seed);
    let model = kmeans::fit(&features, k, N_INIT, &mut rng);
    debug!(%selector, k, inertia = model.inertia, centroids = ?model.centroids, "Clustered transactions");

    let labels = canonical_labels(&model.labels);
    Ok(transactions
        .iter()
        .zip(features)
        .zip(labels)
        .map(|((txn, feature_value), cluster_label)| ClusterAssignment {
            transaction_id: txn.id,
            feature_value,
            cluster_label,
        })
        .collect())
}
