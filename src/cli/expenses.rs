use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{greet, open_db, request_context};
use crate::error::Result;
use crate::export::write_csv;
use crate::fmt::money;
use crate::ledger::{add_expense, parse_date, Ledger, SqliteLedger, DATE_FORMAT};
use crate::models::NewExpense;
use crate::settings::load_settings;

pub fn add(user: Option<&str>, name: &str, category: &str, amount: f64, date: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    let date = match date {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let expense = NewExpense {
        name: name.to_string(),
        category: category.to_string(),
        amount,
        date,
    };
    add_expense(&conn, &ctx.owner, &expense)?;
    println!("{}", "Transaction added successfully!".green());
    Ok(())
}

pub fn list(user: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    let txns = SqliteLedger::new(&conn).get_transactions(&ctx.owner)?;
    greet(&ctx);

    if txns.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Category", "Amount", "Date"]);
    for t in &txns {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(&t.category),
            Cell::new(money(t.amount)),
            Cell::new(t.date.format(DATE_FORMAT)),
        ]);
    }
    let total: f64 = txns.iter().map(|t| t.amount).sum();
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(money(total)),
        Cell::new(""),
    ]);
    println!("Expense Data\n{table}");
    Ok(())
}

pub fn export(user: Option<&str>, output: Option<String>) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    let txns = SqliteLedger::new(&conn).get_transactions(&ctx.owner)?;
    if txns.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let path = output.map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(&settings.data_dir)
            .join("exports")
            .join("expense_data.csv")
    });
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;
    let count = write_csv(&txns, file)?;
    println!("Wrote {count} expenses to {}", path.display());
    Ok(())
}
