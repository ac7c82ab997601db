mod analytics;
mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod ledger;
mod models;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use cli::analytics::ClusterArgs;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Register {
            username,
            password_stdin,
        } => cli::auth::register(&username, password_stdin),
        Commands::Login {
            username,
            password_stdin,
        } => cli::auth::login(&username, password_stdin),
        Commands::Logout => cli::auth::logout(),
        Commands::Whoami => cli::auth::whoami(),
        Commands::Add {
            name,
            category,
            amount,
            date,
        } => cli::expenses::add(user, &name, &category, amount, date.as_deref()),
        Commands::List => cli::expenses::list(user),
        Commands::Export { output } => cli::expenses::export(user, output),
        Commands::Summary => cli::summary::run(user),
        Commands::Series { category, json } => cli::analytics::series(user, &category, json),
        Commands::Predict { category, json } => cli::analytics::predict(user, &category, json),
        Commands::Cluster {
            by,
            clusters,
            seed,
            json,
        } => cli::analytics::cluster(
            user,
            ClusterArgs {
                by: &by,
                clusters: clusters.as_deref(),
                seed,
                json,
            },
        ),
        Commands::Demo => cli::demo::run(user),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
