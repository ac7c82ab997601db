use chrono::{Datelike, Local, Months, NaiveDate};
use rusqlite::Connection;
use tracing::info;

use super::{open_db, request_context};
use crate::error::Result;
use crate::ledger::{add_expense, user_exists};
use crate::models::NewExpense;
use crate::settings::load_settings;

const MONTHS: u32 = 6;

/// Expenses recorded every month.
struct RecurringTxn {
    day: u32,
    name: &'static str,
    category: &'static str,
    amount: f64,
}

const RECURRING: &[RecurringTxn] = &[
    RecurringTxn { day: 1, name: "Rent", category: "Housing", amount: 1450.00 },
    RecurringTxn { day: 3, name: "Transit pass", category: "Transportation", amount: 89.00 },
    RecurringTxn { day: 10, name: "Student loan", category: "DebtandSavings", amount: 310.00 },
    RecurringTxn { day: 15, name: "Gym membership", category: "PersonalandLifestyle", amount: 45.00 },
    RecurringTxn { day: 20, name: "Electricity", category: "Housing", amount: 72.40 },
];

/// One-off expenses; each month picks a subset based on its index.
struct RotatingTxn {
    day: u32,
    name: &'static str,
    category: &'static str,
    amount: f64,
}

const ROTATING: &[RotatingTxn] = &[
    RotatingTxn { day: 6, name: "Groceries", category: "Foodandgroceries", amount: 132.18 },
    RotatingTxn { day: 13, name: "Groceries", category: "Foodandgroceries", amount: 98.45 },
    RotatingTxn { day: 22, name: "Farmers market", category: "Foodandgroceries", amount: 41.20 },
    RotatingTxn { day: 9, name: "Pharmacy", category: "Healthcare", amount: 23.99 },
    RotatingTxn { day: 18, name: "Dentist", category: "Healthcare", amount: 140.00 },
    RotatingTxn { day: 12, name: "Taxi", category: "Transportation", amount: 27.50 },
    RotatingTxn { day: 25, name: "Concert tickets", category: "PersonalandLifestyle", amount: 85.00 },
    RotatingTxn { day: 27, name: "Savings transfer", category: "DebtandSavings", amount: 200.00 },
];

fn on_day(month_start: NaiveDate, day: u32) -> Option<NaiveDate> {
    month_start.with_day(day)
}

fn insert_demo_data(conn: &Connection, owner: &str, today: NaiveDate) -> Result<usize> {
    let this_month = today.with_day(1).unwrap_or(today);
    let mut count = 0;
    for offset in (0..MONTHS).rev() {
        let Some(month_start) = this_month.checked_sub_months(Months::new(offset)) else {
            continue;
        };
        let idx = (MONTHS - 1 - offset) as usize;

        let recurring = RECURRING.iter().map(|r| (r.day, r.name, r.category, r.amount));
        let rotating = ROTATING
            .iter()
            .enumerate()
            .filter(|(i, _)| (i + idx) % 3 != 0)
            .map(|(_, r)| (r.day, r.name, r.category, r.amount * (1.0 + 0.05 * idx as f64)));

        for (day, name, category, amount) in recurring.chain(rotating) {
            let Some(date) = on_day(month_start, day) else { continue };
            if date > today {
                continue;
            }
            let expense = NewExpense {
                name: name.to_string(),
                category: category.to_string(),
                amount: (amount * 100.0).round() / 100.0,
                date,
            };
            add_expense(conn, owner, &expense)?;
            count += 1;
        }
    }
    Ok(count)
}

pub fn run(user: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let ctx = request_context(user, &settings)?;
    let conn = open_db(&settings)?;
    if !user_exists(&conn, &ctx.owner)? {
        return Err(crate::error::SwiftError::UnknownUser(ctx.owner));
    }

    // Idempotency guard
    let existing: i64 = conn.query_row(
        "SELECT count(*) FROM expenses WHERE username = ?1",
        [&ctx.owner],
        |r| r.get(0),
    )?;
    if existing > 0 {
        println!("{} already has {existing} expenses; demo data not loaded.", ctx.owner);
        return Ok(());
    }

    let count = insert_demo_data(&conn, &ctx.owner, Local::now().date_naive())?;
    info!(owner = %ctx.owner, count, "Demo data loaded");

    println!("Demo data loaded!");
    println!("  User:      {}", ctx.owner);
    println!("  Expenses:  {count}");
    println!();
    println!("Try these next:");
    println!("  swift summary");
    println!("  swift predict Housing");
    println!("  swift cluster amount --clusters auto");
    Ok(())
}
