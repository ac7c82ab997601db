use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};

/// Ask for a data directory, keeping `current` on an empty answer or EOF.
fn ask_data_dir<R: BufRead, W: Write>(mut input: R, mut out: W, current: &str) -> Result<String> {
    write!(out, "Data directory [{current}]: ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        debug!(data_dir = current, "Keeping default data directory");
        return Ok(current.to_string());
    }
    let chosen = shellexpand_path(answer);
    debug!(data_dir = %chosen, "Data directory chosen at prompt");
    Ok(chosen)
}

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if settings.data_dir == Settings::default().data_dir {
        settings.data_dir = ask_data_dir(std::io::stdin().lock(), std::io::stdout(), &settings.data_dir)?;
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    info!(data_dir = %resolved.display(), "Database initialized");

    println!("Initialized swift at {}", resolved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_data_dir_uses_answer() {
        let mut out = Vec::new();
        let chosen = ask_data_dir("/tmp/ledger\n".as_bytes(), &mut out, "/home/ann/swift").unwrap();
        assert_eq!(chosen, "/tmp/ledger");
        assert_eq!(String::from_utf8(out).unwrap(), "Data directory [/home/ann/swift]: ");
    }

    #[test]
    fn test_ask_data_dir_keeps_default_on_blank_or_eof() {
        let blank = ask_data_dir("  \n".as_bytes(), Vec::new(), "/home/ann/swift").unwrap();
        assert_eq!(blank, "/home/ann/swift");
        let eof = ask_data_dir("".as_bytes(), Vec::new(), "/home/ann/swift").unwrap();
        assert_eq!(eof, "/home/ann/swift");
    }
}
