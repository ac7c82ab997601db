use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::ledger::DATE_FORMAT;
use crate::models::Transaction;

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Date")]
    date: String,
}

/// Write transactions as CSV with a header row. The owner column is left out.
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in transactions {
        wtr.serialize(ExportRow {
            id: t.id,
            name: &t.name,
            category: &t.category,
            amount: t.amount,
            date: t.date.format(DATE_FORMAT).to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(transactions.len())
}
