use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Ledger CSV configured via `ledgerlens init`.
    #[serde(default)]
    pub ledger_path: String,
    #[serde(default = "default_frequency")]
    pub default_frequency: String,
}

fn default_frequency() -> String {
    "daily".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_path: String::new(),
            default_frequency: default_frequency(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerlens")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
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
        .map_err(|e| LensError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}
