use chrono::NaiveDate;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, SwiftError};
use crate::models::{canonical_category, NewExpense, Transaction, User};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-only source of a user's transactions.
pub trait Ledger {
    /// All transactions owned by `owner`, in insertion order.
    fn get_transactions(&self, owner: &str) -> Result<Vec<Transaction>>;
}

pub struct SqliteLedger<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Ledger for SqliteLedger<'_> {
    fn get_transactions(&self, owner: &str) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, name, category, amount, date FROM expenses \
             WHERE username = ?1 ORDER BY id",
        )?;
        let rows: Vec<(i64, String, String, String, f64, String)> = stmt
            .query_map([owner], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let txns = rows
            .into_iter()
            .map(|(id, owner, name, category, amount, date)| {
                Ok(Transaction {
                    id,
                    owner,
                    name,
                    category,
                    amount,
                    date: parse_date(&date)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(owner, count = txns.len(), "Loaded ledger snapshot");
        Ok(txns)
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| SwiftError::InvalidDate(s.to_string()))
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn find_user(conn: &Connection, username: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, password_hash, salt FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    salt: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn user_exists(conn: &Connection, username: &str) -> Result<bool> {
    Ok(find_user(conn, username)?.is_some())
}

pub fn register_user(conn: &Connection, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(SwiftError::Other(
            "Please enter both username and password".to_string(),
        ));
    }
    if user_exists(conn, username)? {
        return Err(SwiftError::UserExists(username.to_string()));
    }
    let salt = hex::encode(rand::thread_rng().gen::<[u8; 16]>());
    let hash = hash_password(&salt, password);
    conn.execute(
        "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)",
        rusqlite::params![username, hash, salt],
    )?;
    info!(username, "Registered user");
    Ok(())
}

pub fn authenticate_user(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let user = find_user(conn, username)?.ok_or(SwiftError::AuthFailed)?;
    if hash_password(&user.salt, password) != user.password_hash {
        return Err(SwiftError::AuthFailed);
    }
    Ok(user)
}

/// Append an expense to `owner`'s ledger. Returns the new row id.
pub fn add_expense(conn: &Connection, owner: &str, expense: &NewExpense) -> Result<i64> {
    let category = canonical_category(&expense.category)
        .ok_or_else(|| SwiftError::UnknownCategory(expense.category.clone()))?;
    if !expense.amount.is_finite() || expense.amount < 0.01 {
        return Err(SwiftError::InvalidAmount(expense.amount));
    }
    if !user_exists(conn, owner)? {
        return Err(SwiftError::UnknownUser(owner.to_string()));
    }
    conn.execute(
        "INSERT INTO expenses (username, name, category, amount, date) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            owner,
            expense.name.trim(),
            category,
            expense.amount,
            expense.date.format(DATE_FORMAT).to_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(owner, id, category, amount = expense.amount, "Added expense");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn expense(name: &str, category: &str, amount: f64, date: &str) -> NewExpense {
        NewExpense {
            name: name.to_string(),
            category: category.to_string(),
            amount,
            date: parse_date(date).unwrap(),
        }
    }

    #[test]
    fn test_register_and_authenticate() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "hunter2").unwrap();
        let user = authenticate_user(&conn, "ann", "hunter2").unwrap();
        assert_eq!(user.username, "ann");
        assert_ne!(user.password_hash, "hunter2");
        register_user(&conn, "bob", "hunter3").unwrap();
        let bob = authenticate_user(&conn, "bob", "hunter3").unwrap();
        assert!(user.id > 0);
        assert_ne!(bob.id, user.id);
    }

    #[test]
    fn test_authenticate_rejects_wrong_password() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "hunter2").unwrap();
        assert!(matches!(
            authenticate_user(&conn, "ann", "nope"),
            Err(SwiftError::AuthFailed)
        ));
        assert!(matches!(
            authenticate_user(&conn, "bob", "hunter2"),
            Err(SwiftError::AuthFailed)
        ));
    }

    #[test]
    fn test_register_duplicate_username() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "a").unwrap();
        assert!(matches!(
            register_user(&conn, "ann", "b"),
            Err(SwiftError::UserExists(_))
        ));
    }

    #[test]
    fn test_register_requires_both_fields() {
        let (_dir, conn) = test_db();
        assert!(register_user(&conn, "  ", "pw").is_err());
        assert!(register_user(&conn, "ann", "").is_err());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "same").unwrap();
        register_user(&conn, "bob", "same").unwrap();
        let a = authenticate_user(&conn, "ann", "same").unwrap();
        let b = authenticate_user(&conn, "bob", "same").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn test_add_and_read_back_in_insertion_order() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "pw").unwrap();
        add_expense(&conn, "ann", &expense("Rent", "housing", 100.0, "2024-02-01")).unwrap();
        add_expense(&conn, "ann", &expense("Bus", "Transportation", 2.5, "2024-01-01")).unwrap();

        let txns = SqliteLedger::new(&conn).get_transactions("ann").unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].name, "Rent");
        assert_eq!(txns[0].category, "Housing");
        assert_eq!(txns[1].date, parse_date("2024-01-01").unwrap());
    }

    #[test]
    fn test_ledger_is_scoped_to_owner() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "pw").unwrap();
        register_user(&conn, "bob", "pw").unwrap();
        add_expense(&conn, "ann", &expense("Rent", "Housing", 100.0, "2024-01-01")).unwrap();
        add_expense(&conn, "bob", &expense("Taxi", "Transportation", 20.0, "2024-01-01")).unwrap();

        let ledger = SqliteLedger::new(&conn);
        let ann = ledger.get_transactions("ann").unwrap();
        assert_eq!(ann.len(), 1);
        assert!(ann.iter().all(|t| t.owner == "ann"));
    }

    #[test]
    fn test_add_expense_validates_input() {
        let (_dir, conn) = test_db();
        register_user(&conn, "ann", "pw").unwrap();
        assert!(matches!(
            add_expense(&conn, "ann", &expense("X", "Groceries", 5.0, "2024-01-01")),
            Err(SwiftError::UnknownCategory(_))
        ));
        assert!(matches!(
            add_expense(&conn, "ann", &expense("X", "Housing", 0.0, "2024-01-01")),
            Err(SwiftError::InvalidAmount(_))
        ));
        for amount in [f64::INFINITY, f64::NAN, -3.0] {
            assert!(matches!(
                add_expense(&conn, "ann", &expense("X", "Housing", amount, "2024-01-01")),
                Err(SwiftError::InvalidAmount(_))
            ));
        }
        assert!(SqliteLedger::new(&conn).get_transactions("ann").unwrap().is_empty());
        assert!(matches!(
            add_expense(&conn, "ghost", &expense("X", "Housing", 5.0, "2024-01-01")),
            Err(SwiftError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
