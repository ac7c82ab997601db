use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!(
        "User:       {}",
        if settings.session_user.is_empty() { "(not logged in)" } else { &settings.session_user }
    );
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Clusters:   {:?} (seed {})", settings.cluster_count, settings.cluster_seed);

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let users: i64 = conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?;
        let expenses: i64 = conn.query_row("SELECT count(*) FROM expenses", [], |r| r.get(0))?;

        println!();
        println!("Users:      {users}");
        println!("Expenses:   {expenses}");
    } else {
        println!();
        println!("Database not found. Run `swift init` to set up.");
    }

    Ok(())
}
