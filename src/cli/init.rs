use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn run(output_dir: Option<String>, archive_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = output_dir {
        settings.output_dir = shellexpand_path(&dir);
    }
    if let Some(dir) = archive_dir {
        settings.archive_dir = shellexpand_path(&dir);
    }

    save_settings(&settings)?;

    println!("Settings written to {}", settings_path().display());
    println!("  Upload files: {}", settings.output_dir);
    println!("  Archive:      {}", settings.archive_dir);
    Ok(())
}

fn shellexpand_path(path: &str) -> String {
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
