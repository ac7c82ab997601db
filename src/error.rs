use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwiftError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No transactions recorded in category: {0}")]
    EmptyCategory(String),

    #[error("Not enough data to forecast: need at least 2 distinct dates, found {distinct_dates}")]
    InsufficientData { distinct_dates: usize },

    #[error("There is no data available to cluster")]
    EmptyClusterInput,

    #[error("Unknown feature selector: {0} (expected category, date or amount)")]
    UnknownFeatureSelector(String),

    #[error("Invalid cluster count: {0}")]
    InvalidClusterCount(usize),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Username already exists: {0}")]
    UserExists(String),

    #[error("Invalid username or password")]
    AuthFailed,

    #[error("Not logged in. Run `swift login <username>` or pass --user.")]
    NotLoggedIn,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid amount: {0} (must be a finite number of at least 0.01)")]
    InvalidAmount(f64),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl SwiftError {
    /// True for the "nothing to analyze" outcomes the CLI reports as a
    /// friendly message instead of a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            SwiftError::EmptyCategory(_)
                | SwiftError::InsufficientData { .. }
                | SwiftError::EmptyClusterInput
        )
    }
}

pub type Result<T> = std::result::Result<T, SwiftError>;
