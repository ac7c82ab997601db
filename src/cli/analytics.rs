use comfy_table::{Cell, Table};

use super::{greet, open_db, report_no_data, request_context};
use crate::analytics::{ClusterCount, Engine, EngineConfig, FeatureSelector};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::{SqliteLedger, DATE_FORMAT};
use crate::models::canonical_category;
use crate::settings::load_settings;

fn category_arg(category: &str) -> &str {
    canonical_category(category).unwrap_or(category)
}

pub fn series(user: Option<&str>, category: &str, json: bool) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    let engine = Engine::new(SqliteLedger::new(&conn), settings.engine_config());
    let category = category_arg(category);
    let points = engine.daily_series(&ctx, category)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }
    greet(&ctx);
    if points.is_empty() {
        println!("No transactions recorded in {category}.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Total"]);
    for p in &points {
        table.add_row(vec![
            Cell::new(p.date.format(DATE_FORMAT)),
            Cell::new(money(p.total_amount)),
        ]);
    }
    println!("{category} by Day\n{table}");
    Ok(())
}

pub fn predict(user: Option<&str>, category: &str, json: bool) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    let category = category_arg(category);

    let engine = Engine::new(SqliteLedger::new(&conn), settings.engine_config());
    let report = match engine.forecast(&ctx, category) {
        Ok(r) => r,
        Err(e) => return report_no_data(e),
    };
    let result = &report.forecast;

    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    greet(&ctx);

    let mut existing = Table::new();
    existing.set_header(vec!["Date", "Actual", "Fitted"]);
    for ((date, fitted), point) in result
        .existing_dates
        .iter()
        .zip(&result.existing_predictions)
        .zip(&report.series)
    {
        existing.add_row(vec![
            Cell::new(date.format(DATE_FORMAT)),
            Cell::new(money(point.total_amount)),
            Cell::new(money(*fitted)),
        ]);
    }
    println!("Expense Prediction: {category}\n{existing}");

    let mut future = Table::new();
    future.set_header(vec!["Date", "Predicted Expense"]);
    for (date, p) in result.future_dates.iter().zip(&result.future_predictions) {
        future.add_row(vec![Cell::new(date.format(DATE_FORMAT)), Cell::new(money(*p))]);
    }
    println!("\nFuture Predicted Expenses\n{future}");
    Ok(())
}

pub struct ClusterArgs<'a> {
    pub by: &'a str,
    pub clusters: Option<&'a str>,
    pub seed: Option<u64>,
    pub json: bool,
}

fn cluster_config(base: EngineConfig, args: &ClusterArgs) -> Result<EngineConfig> {
    let mut config = base;
    if let Some(count) = args.clusters {
        config.cluster.count = count.parse::<ClusterCount>()?;
    }
    if let Some(seed) = args.seed {
        config.cluster.seed = seed;
    }
    Ok(config)
}

pub fn cluster(user: Option<&str>, args: ClusterArgs) -> Result<()> {
    let selector: FeatureSelector = args.by.parse()?;
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;

    let config = cluster_config(settings.engine_config(), &args)?;
    let engine = Engine::new(SqliteLedger::new(&conn), config);
    let report = match engine.cluster(&ctx, selector) {
        Ok(r) => r,
        Err(e) => return report_no_data(e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.assignments)?);
        return Ok(());
    }
    greet(&ctx);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Category", "Amount", "Date", "Cluster"]);
    for (t, a) in report.transactions.iter().zip(&report.assignments) {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(&t.category),
            Cell::new(money(t.amount)),
            Cell::new(t.date.format(DATE_FORMAT)),
            Cell::new(a.cluster_label),
        ]);
    }
    println!("Clustering by {selector}\n{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(clusters: Option<&'static str>, seed: Option<u64>) -> ClusterArgs<'static> {
        ClusterArgs {
            by: "amount",
            clusters,
            seed,
            json: false,
        }
    }

    #[test]
    fn test_cluster_config_defaults_to_settings() {
        let base = EngineConfig::default();
        assert_eq!(cluster_config(base, &args(None, None)).unwrap(), base);
    }

    #[test]
    fn test_cluster_config_flags_override() {
        let base = EngineConfig::default();
        let fixed = cluster_config(base, &args(Some("4"), Some(8))).unwrap();
        assert_eq!(fixed.cluster.count, ClusterCount::Fixed(4));
        assert_eq!(fixed.cluster.seed, 8);
        let auto = cluster_config(base, &args(Some("auto"), None)).unwrap();
        assert_eq!(auto.cluster.count, ClusterCount::Auto);
        assert_eq!(auto.cluster.seed, base.cluster.seed);
        assert!(cluster_config(base, &args(Some("many"), None)).is_err());
    }

    #[test]
    fn test_category_arg_canonicalizes_known_names() {
        assert_eq!(category_arg("housing"), "Housing");
        assert_eq!(category_arg("Other"), "Other");
    }
}
