//! Upload files, the unmatched report, and the input archive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{PayfillError, Result};
use crate::models::{MappedRecord, MatchType, FINAL_COLUMNS};

pub const UNKNOWN_BUCKET: &str = "unknown";
pub const UPLOAD_PREFIX: &str = "PayrollUpload";

/// Output bucket for a raw check date: the ISO date, or `unknown`.
pub fn date_bucket(check_date: Option<&str>) -> String {
    check_date
        .and_then(|d| chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_BUCKET.to_string())
}

/// Dated buckets in ascending order, with `unknown` last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    Date(String),
    Unknown,
}

impl BucketKey {
    fn from_check_date(check_date: Option<&str>) -> Self {
        match date_bucket(check_date) {
            b if b == UNKNOWN_BUCKET => Self::Unknown,
            b => Self::Date(b),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Date(d) => d,
            Self::Unknown => UNKNOWN_BUCKET,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{UPLOAD_PREFIX}-{}.csv", self.name())
    }
}

/// Matched rows grouped by check date. Unmatched roster rows are left out.
pub fn group_by_check_date(records: &[MappedRecord]) -> BTreeMap<BucketKey, Vec<&MappedRecord>> {
    let mut groups: BTreeMap<BucketKey, Vec<&MappedRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.match_type != MatchType::Unmatched) {
        let key = BucketKey::from_check_date(record.check_date.as_deref());
        if key == BucketKey::Unknown {
            warn!(
                employee = %format!("{} {}", record.roster.first_name, record.roster.last_name),
                check_date = record.check_date.as_deref().unwrap_or(""),
                "check date is not YYYY-MM-DD; grouping under unknown"
            );
        }
        groups.entry(key).or_default().push(record);
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub rows: usize,
    pub gross_pay: f64,
    pub pretax: f64,
    pub pretax_catchup: f64,
    pub roth: f64,
    pub roth_catchup: f64,
    pub safe_harbor: f64,
    pub hours_worked: f64,
}

impl Totals {
    pub fn add(&mut self, r: &MappedRecord) {
        self.rows += 1;
        self.gross_pay += r.gross_pay;
        self.pretax += r.pretax;
        self.pretax_catchup += r.pretax_catchup;
        self.roth += r.roth;
        self.roth_catchup += r.roth_catchup;
        self.safe_harbor += r.safe_harbor;
        self.hours_worked += r.hours_worked;
    }

    pub fn of<'a>(records: impl IntoIterator<Item = &'a MappedRecord>) -> Self {
        let mut totals = Self::default();
        for r in records {
            totals.add(r);
        }
        totals
    }
}

fn money_cell(v: f64) -> String {
    format!("{v:.2}")
}

fn upload_row(r: &MappedRecord) -> Vec<String> {
    let mut row: Vec<String> = r.roster.identity_values().iter().map(|v| v.to_string()).collect();
    row.push(r.check_date.clone().unwrap_or_default());
    for v in [
        r.gross_pay,
        r.hours_worked,
        r.pretax,
        r.pretax_catchup,
        r.roth,
        r.roth_catchup,
        r.safe_harbor,
    ] {
        row.push(money_cell(v));
    }
    row.push(r.roster.profit_share.clone());
    row
}

/// Write one upload file per bucket into `out_dir`. Returns the written paths.
pub fn write_uploads(
    out_dir: &Path,
    groups: &BTreeMap<BucketKey, Vec<&MappedRecord>>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    for (key, records) in groups {
        let path = out_dir.join(key.file_name());
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(FINAL_COLUMNS)?;
        for r in records {
            wtr.write_record(upload_row(r))?;
        }
        wtr.flush()?;
        info!(path = %path.display(), rows = records.len(), "wrote upload file");
        written.push(path);
    }
    Ok(written)
}

pub const UNMATCHED_COLUMNS: &[&str] = &["First Name", "MI", "Last Name", "Match Type"];

/// Write the unmatched-employee report when any roster row went unmatched.
pub fn write_unmatched_report(out_dir: &Path, records: &[MappedRecord], stamp: &str) -> Result<Option<PathBuf>> {
    let unmatched: Vec<&MappedRecord> = records
        .iter()
        .filter(|r| r.match_type == MatchType::Unmatched)
        .collect();
    if unmatched.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("unmatched-{stamp}.csv"));
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(UNMATCHED_COLUMNS)?;
    for r in &unmatched {
        wtr.write_record([
            r.roster.first_name.as_str(),
            r.roster.middle_initial.as_str(),
            r.roster.last_name.as_str(),
            r.match_type.label(),
        ])?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = unmatched.len(), "wrote unmatched report");
    Ok(Some(path))
}

/// Copy the input verbatim to `<archive_dir>/<stem>-<stamp>.<ext>`.
pub fn archive_input(input: &Path, archive_dir: &Path, stamp: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PayfillError::Other(format!("Cannot archive {}", input.display())))?;
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{stamp}.{ext}"),
        None => format!("{stem}-{stamp}"),
    };
    std::fs::create_dir_all(archive_dir)?;
    let dest = archive_dir.join(name);
    let data = std::fs::read(input)?;
    std::fs::write(&dest, &data)?;
    let digest = hex::encode(Sha256::digest(&data));
    info!(path = %dest.display(), sha256 = %digest, "archived input");
    Ok(dest)
}

/// Local timestamp used in archive and report names.
pub fn run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RosterRecord;

    fn record(first: &str, date: Option<&str>, match_type: MatchType) -> MappedRecord {
        MappedRecord {
            roster: RosterRecord {
                first_name: first.to_string(),
                last_name: "Test".to_string(),
                ..Default::default()
            },
            match_type,
            check_date: date.map(str::to_string),
            gross_pay: 100.0,
            hours_worked: 8.0,
            pretax: 10.0,
            pretax_catchup: 0.0,
            roth: 5.0,
            roth_catchup: 0.0,
            safe_harbor: 2.5,
        }
    }

    #[test]
    fn test_date_bucket() {
        assert_eq!(date_bucket(Some("2025-09-05")), "2025-09-05");
        assert_eq!(date_bucket(Some(" 2025-09-05 ")), "2025-09-05");
        assert_eq!(date_bucket(Some("09/05/2025")), UNKNOWN_BUCKET);
        assert_eq!(date_bucket(Some("2025-02-30")), UNKNOWN_BUCKET);
        assert_eq!(date_bucket(None), UNKNOWN_BUCKET);
    }

    #[test]
    fn test_grouping_skips_unmatched_and_orders_unknown_last() {
        let records = vec![
            record("A", Some("2025-09-12"), MatchType::Loose),
            record("B", Some("garbage"), MatchType::Strict),
            record("C", Some("2025-09-05"), MatchType::Strict),
            record("D", None, MatchType::Unmatched),
            record("E", Some("2025-09-05"), MatchType::Loose),
        ];
        let groups = group_by_check_date(&records);
        let keys: Vec<&str> = groups.keys().map(BucketKey::name).collect();
        assert_eq!(keys, ["2025-09-05", "2025-09-12", "unknown"]);
        assert_eq!(groups[&BucketKey::Date("2025-09-05".into())].len(), 2);
    }

    #[test]
    fn test_write_uploads_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record("A", Some("2025-09-05"), MatchType::Strict)];
        let written = write_uploads(dir.path(), &group_by_check_date(&records)).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("PayrollUpload-2025-09-05.csv"));

        let mut rdr = csv::Reader::from_path(&written[0]).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, FINAL_COLUMNS);
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "A");
        assert_eq!(&row[14], "2025-09-05");
        assert_eq!(&row[15], "100.00");
    }

    #[test]
    fn test_unmatched_report_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let matched = vec![record("A", Some("2025-09-05"), MatchType::Strict)];
        assert!(write_unmatched_report(dir.path(), &matched, "20250101-000000").unwrap().is_none());

        let mixed = vec![
            record("A", Some("2025-09-05"), MatchType::Strict),
            record("Zoe", None, MatchType::Unmatched),
        ];
        let path = write_unmatched_report(dir.path(), &mixed, "20250101-000000").unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("First Name,MI,Last Name,Match Type"));
        assert!(content.contains("Zoe,,Test,unmatched"));
        assert!(!content.contains("A,,Test"));
    }

    #[test]
    fn test_archive_copies_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "a,b\n1,2\n").unwrap();
        let dest = archive_input(&input, &dir.path().join("archive"), "20250101-000000").unwrap();
        assert_eq!(dest.file_name().unwrap(), "in-20250101-000000.csv");
        assert_eq!(std::fs::read(&dest).unwrap(), std::fs::read(&input).unwrap());
    }

    #[test]
    fn test_totals() {
        let records = vec![
            record("A", Some("2025-09-05"), MatchType::Strict),
            record("B", Some("2025-09-05"), MatchType::Loose),
        ];
        let totals = Totals::of(&records);
        assert_eq!(totals.rows, 2);
        assert_eq!(totals.gross_pay, 200.0);
        assert_eq!(totals.safe_harbor, 5.0);
    }
}
