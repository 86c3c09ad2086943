use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PayfillError, Result};
use crate::header::DEFAULT_SCAN_LINES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
    #[serde(default = "default_scan_lines")]
    pub header_scan_lines: usize,
    /// Extra vendor spellings per canonical column, merged into the builtin table.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_archive_dir() -> String {
    "data/archive".to_string()
}

fn default_scan_lines() -> usize {
    DEFAULT_SCAN_LINES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            archive_dir: default_archive_dir(),
            header_scan_lines: default_scan_lines(),
            aliases: BTreeMap::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("payfill")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Settings stored at `path`; defaults when the file is missing or unreadable.
fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PayfillError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
