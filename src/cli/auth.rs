use std::io::BufRead;

use colored::Colorize;
use tracing::info;
use zeroize::Zeroize;

use super::open_db;
use crate::error::{Result, SwiftError};
use crate::ledger::{authenticate_user, register_user};
use crate::settings::{load_settings, save_settings};

fn read_password(from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        let password = line.trim_end_matches(['\r', '\n']).to_string();
        line.zeroize();
        Ok(password)
    } else {
        Ok(rpassword::prompt_password("Password: ")?)
    }
}

pub fn register(username: &str, password_stdin: bool) -> Result<()> {
    let settings = load_settings();
    let conn = open_db(&settings)?;
    let mut password = read_password(password_stdin)?;
    let result = register_user(&conn, username, &password);
    password.zeroize();
    result?;
    println!("{}", "Account created successfully".green());
    Ok(())
}

pub fn login(username: &str, password_stdin: bool) -> Result<()> {
    let mut settings = load_settings();
    if !settings.session_user.is_empty() && settings.session_user != username {
        println!(
            "You are logged in as {}. Logging in as {username} replaces that session.",
            settings.session_user
        );
    }
    let conn = open_db(&settings)?;
    let mut password = read_password(password_stdin)?;
    let result = authenticate_user(&conn, username, &password);
    password.zeroize();
    let user = result?;
    info!(user_id = user.id, username = %user.username, "Session started");

    settings.session_user = user.username;
    save_settings(&settings)?;
    println!("{}", format!("Logged in as {}", settings.session_user).green());
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut settings = load_settings();
    if settings.session_user.is_empty() {
        return Err(SwiftError::NotLoggedIn);
    }
    let previous = std::mem::take(&mut settings.session_user);
    save_settings(&settings)?;
    println!("Logged out {previous}");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let settings = load_settings();
    if settings.session_user.is_empty() {
        return Err(SwiftError::NotLoggedIn);
    }
    println!("{}", settings.session_user);
    Ok(())
}
