use chrono::NaiveDate;
use serde::Serialize;

/// Categories offered when recording an expense.
pub const CATEGORIES: &[&str] = &[
    "Housing",
    "Transportation",
    "Foodandgroceries",
    "Healthcare",
    "PersonalandLifestyle",
    "DebtandSavings",
];

/// Case-insensitive lookup of a known category, returning its canonical name.
pub fn canonical_category(name: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(name.trim()))
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}

/// One recorded expense. Rows are never updated once inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Input for a new ledger row, before the database assigns an id.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Identity of the caller for a single request. Every analytic call takes one
/// explicitly; nothing reads the persisted session behind its back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub owner: String,
}

impl RequestContext {
    pub fn new(owner: impl Into<String>) -> Self {
        Self { owner: owner.into() }
    }
}
