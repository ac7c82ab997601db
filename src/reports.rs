use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Category distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: i64,
    pub pct: f64,
}

pub fn get_category_totals(conn: &Connection, owner: &str) -> Result<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT category, SUM(amount) AS total, COUNT(*) AS count \
         FROM expenses WHERE username = ?1 \
         GROUP BY category ORDER BY total DESC, category",
    )?;
    let raw: Vec<(String, f64, i64)> = stmt
        .query_map([owner], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let grand: f64 = raw.iter().map(|(_, t, _)| t).sum();
    Ok(raw
        .into_iter()
        .map(|(category, total, count)| CategoryTotal {
            category,
            total,
            count,
            pct: if grand != 0.0 { total / grand * 100.0 } else { 0.0 },
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Daily totals (all categories)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub total: f64,
}

pub fn get_daily_totals(conn: &Connection, owner: &str) -> Result<Vec<DailyTotal>> {
    let mut stmt = conn.prepare(
        "SELECT date, SUM(amount) AS total FROM expenses \
         WHERE username = ?1 GROUP BY date ORDER BY date",
    )?;
    let rows = stmt
        .query_map([owner], |row| {
            Ok(DailyTotal {
                date: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
