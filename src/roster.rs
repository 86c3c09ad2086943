use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PayfillError, Result};
use crate::header::read_text;
use crate::models::{RosterRecord, ROSTER_COLUMNS};

pub const ROSTER_ENV: &str = "ROSTER_PATH";
const CONVENTIONAL_PATH: &str = "templates/roster.csv";

/// Find the roster file.
///
/// An explicit override (the `--roster` flag or `ROSTER_PATH`) must exist.
/// Without one, `templates/roster.csv` is tried under the working directory,
/// then next to the executable.
pub fn resolve_roster_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(PayfillError::RosterNotFound(path.display().to_string()));
    }

    let mut candidates = vec![PathBuf::from(CONVENTIONAL_PATH)];
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        candidates.push(dir.join(CONVENTIONAL_PATH));
    }
    for candidate in &candidates {
        debug!(candidate = %candidate.display(), "looking for roster");
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }
    Err(PayfillError::RosterNotFound(
        candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    ))
}

/// Load every roster row; missing columns and short rows read as blank.
pub fn load_roster(path: &Path) -> Result<Vec<RosterRecord>> {
    let text = read_text(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let absent: Vec<&str> = ROSTER_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !absent.is_empty() {
        warn!(columns = %absent.join(", "), "roster is missing columns; they will be blank");
    }
    let mut records = Vec::new();
    for result in rdr.records() {
        let mut row = result?;
        row.truncate(headers.len());
        while row.len() < headers.len() {
            row.push_field("");
        }
        let record: RosterRecord = row.deserialize(Some(&headers))?;
        if record.first_name.is_empty() && record.last_name.is_empty() {
            continue;
        }
        records.push(record);
    }
    info!(path = %path.display(), employees = records.len(), "loaded roster");
    Ok(records)
}
