use comfy_table::{Cell, Table};

use super::{greet, open_db, request_context};
use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::settings::load_settings;

pub fn run(user: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    greet(&ctx);

    let categories = reports::get_category_totals(&conn, &ctx.owner)?;
    if categories.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%", "Count"]);
    for item in &categories {
        table.add_row(vec![
            Cell::new(&item.category),
            Cell::new(money(item.total)),
            Cell::new(format!("{:.1}%", item.pct)),
            Cell::new(item.count),
        ]);
    }
    println!("Expense Distribution by Category\n{table}");

    let days = reports::get_daily_totals(&conn, &ctx.owner)?;
    let mut dtable = Table::new();
    dtable.set_header(vec!["Day", "Total Expense"]);
    for d in &days {
        dtable.add_row(vec![Cell::new(&d.date), Cell::new(money(d.total))]);
    }
    println!("\nDaily Expenses\n{dtable}");
    Ok(())
}
