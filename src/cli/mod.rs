pub mod analytics;
pub mod auth;
pub mod demo;
pub mod expenses;
pub mod init;
pub mod status;
pub mod summary;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{Result, SwiftError};
use crate::models::RequestContext;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "swift", about = "Budgeting made effortless: track, forecast and cluster your expenses.")]
pub struct Cli {
    /// Act as this user for one command instead of the logged-in session
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for SWIFT data (default: ~/Documents/swift)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Create a new user account.
    Register {
        username: String,
        /// Read the password from stdin instead of prompting
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Log in and remember the user for later commands.
    Login {
        username: String,
        /// Read the password from stdin instead of prompting
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Forget the logged-in user.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Record an expense.
    Add {
        /// Expense name, e.g. 'Rent'
        name: String,
        /// Housing, Transportation, Foodandgroceries, Healthcare,
        /// PersonalandLifestyle or DebtandSavings
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded expenses.
    List,
    /// Export expenses to CSV.
    Export {
        /// Output file path (default: <data_dir>/exports/expense_data.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Spending by category and by day.
    Summary,
    /// Daily totals for one category.
    Series {
        category: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Forecast a category's spend for the next five months.
    Predict {
        category: String,
        #[arg(long)]
        json: bool,
    },
    /// Group expenses by category, date or amount.
    Cluster {
        /// Feature to cluster by: category, date or amount
        by: String,
        /// Number of clusters: a count, `auto` (scaled to the number of
        /// expenses) or `legacy` (one per expense, the default)
        #[arg(long)]
        clusters: Option<String>,
        /// Seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Load sample expenses for the current user.
    Demo,
    /// Show data directory, session and summary counts.
    Status,
}

pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let path = settings.db_path();
    if !path.exists() {
        return Err(SwiftError::Other(
            "No database found. Run `swift init` first.".to_string(),
        ));
    }
    get_connection(&path)
}

/// Build the request context from `--user` or the remembered session.
pub(crate) fn request_context(user: Option<&str>, settings: &Settings) -> Result<RequestContext> {
    match user {
        Some(u) if !u.trim().is_empty() => Ok(RequestContext::new(u.trim())),
        _ if !settings.session_user.is_empty() => Ok(RequestContext::new(settings.session_user.clone())),
        _ => Err(SwiftError::NotLoggedIn),
    }
}

pub(crate) fn greet(ctx: &RequestContext) {
    println!("{}", format!("Hello, {}", ctx.owner).green());
}

/// Print the friendly message for "nothing to analyze" outcomes and pass
/// every other error through.
pub(crate) fn report_no_data(err: SwiftError) -> Result<()> {
    if err.is_no_data() {
        eprintln!("{}", err.to_string().yellow());
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_prefers_flag() {
        let settings = Settings {
            session_user: "ann".to_string(),
            ..Settings::default()
        };
        assert_eq!(request_context(Some("bob"), &settings).unwrap().owner, "bob");
        assert_eq!(request_context(None, &settings).unwrap().owner, "ann");
    }

    #[test]
    fn test_request_context_requires_login() {
        let settings = Settings::default();
        assert!(matches!(
            request_context(None, &settings),
            Err(SwiftError::NotLoggedIn)
        ));
        assert!(matches!(
            request_context(Some("  "), &settings),
            Err(SwiftError::NotLoggedIn)
        ));
    }

    #[test]
    fn test_report_no_data_swallows_only_no_data() {
        assert!(report_no_data(SwiftError::EmptyClusterInput).is_ok());
        assert!(report_no_data(SwiftError::EmptyCategory("Housing".into())).is_ok());
        assert!(report_no_data(SwiftError::AuthFailed).is_err());
    }

    #[test]
    fn test_cli_parses_cluster_flags() {
        let cli = Cli::try_parse_from(["swift", "--user", "ann", "cluster", "amount", "--clusters", "2", "--seed", "9"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("ann"));
        match cli.command {
            Commands::Cluster { by, clusters, seed, json } => {
                assert_eq!(by, "amount");
                assert_eq!(clusters.as_deref(), Some("2"));
                assert_eq!(seed, Some(9));
                assert!(!json);
            }
            _ => panic!("expected cluster command"),
        }
        assert!(Cli::try_parse_from(["swift", "cluster", "amount", "--seed", "x"]).is_err());
    }
}
