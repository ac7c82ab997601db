use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analytics::{ClusterCount, ClusterOptions, EngineConfig};
use crate::db::DB_FILE;
use crate::error::{Result, SwiftError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Username remembered by `swift login`. Empty when logged out.
    #[serde(default)]
    pub session_user: String,
    #[serde(default = "default_cluster_seed")]
    pub cluster_seed: u64,
    #[serde(default)]
    pub cluster_count: ClusterCount,
}

fn default_cluster_seed() -> u64 {
    ClusterOptions::default().seed
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            session_user: String::new(),
            cluster_seed: default_cluster_seed(),
            cluster_count: ClusterCount::default(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cluster: ClusterOptions {
                count: self.cluster_count,
                seed: self.cluster_seed,
            },
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("swift")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("swift")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SwiftError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
