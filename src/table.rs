//! A loaded export: ordered headers plus row-major text cells.
//!
//! Cells stay text until field mapping; columns are looked up by name with
//! explicit presence checks so an absent optional column is a `None`, not a
//! failure.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::header::{read_text, sniff_delimiter};
use crate::schema::{normalize, AliasMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell under `column`, or `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        Some(self.cells.get(idx).map(String::as_str).unwrap_or(""))
    }

    /// Cell under `column` with surrounding whitespace removed, blank when absent.
    pub fn text(&self, column: &str) -> &'a str {
        self.get(column).unwrap_or("").trim()
    }
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Load a delimited file whose header sits on line `header_row`.
    ///
    /// Lines above the header are skipped verbatim, the delimiter is sniffed
    /// from the remaining text, blank-named columns are dropped and fully blank
    /// data rows are ignored.
    pub fn load(path: &Path, header_row: usize) -> Result<Self> {
        let text = read_text(path)?;
        Self::parse(skip_lines(&text, header_row))
    }

    /// Parse delimited text whose first record is the header.
    pub fn parse(text: &str) -> Result<Self> {
        let delimiter = sniff_delimiter(text);
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = rdr.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Ok(Self::default()),
        };
        let keep: Vec<usize> = (0..headers.len())
            .filter(|&i| !headers[i].is_empty())
            .collect();

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            rows.push(
                keep.iter()
                    .map(|&i| record.get(i).unwrap_or("").to_string())
                    .collect(),
            );
        }
        let headers = keep.iter().map(|&i| headers[i].clone()).collect();
        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        self.rows.get(idx).map(|cells| Row { table: self, cells })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }

    /// Rename raw vendor columns to their canonical names.
    ///
    /// For each canonical field in schema order, the first not-yet-renamed
    /// column (in column order) whose normalized header is an accepted
    /// spelling takes the canonical name. Afterwards only the first column of
    /// any repeated name is kept.
    pub fn rename_by_alias(&mut self, alias_map: &AliasMap) {
        let normalized: Vec<String> = self.headers.iter().map(|h| normalize(h)).collect();
        let mut renamed = vec![false; self.headers.len()];
        for (canon, spellings) in alias_map {
            let hit = (0..self.headers.len()).find(|&i| !renamed[i] && spellings.contains(&normalized[i]));
            if let Some(i) = hit {
                if self.headers[i] != *canon {
                    debug!(from = %self.headers[i], to = %canon, "renamed column");
                }
                self.headers[i] = canon.clone();
                renamed[i] = true;
            }
        }
        self.dedup_columns();
    }

    /// Keep only the first column of each header name.
    pub fn dedup_columns(&mut self) {
        let mut seen = HashSet::new();
        let keep: Vec<bool> = self.headers.iter().map(|h| seen.insert(h.clone())).collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        for (i, h) in self.headers.iter().enumerate() {
            if !keep[i] {
                debug!(column = %h, "dropped duplicate column");
            }
        }
        let filter = |v: &mut Vec<String>| {
            let mut i = 0;
            v.retain(|_| {
                let k = keep.get(i).copied().unwrap_or(true);
                i += 1;
                k
            });
        };
        filter(&mut self.headers);
        for row in &mut self.rows {
            filter(row);
        }
    }
}

/// The part of `text` after its first `n` physical lines.
fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaConfig;

    #[test]
    fn test_load_skips_to_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(
            &path,
            "Acme Payroll\n\nReport,Run\nEmployee Last Name,Employee First Name,Pay Date\nDoe,Jane A,2025-09-05\n,,\nSmith,John,2025-09-12\n",
        )
        .unwrap();
        let table = Table::load(&path, 3).unwrap();
        assert_eq!(table.headers(), ["Employee Last Name", "Employee First Name", "Pay Date"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(1).unwrap().text("Employee First Name"), "John");
    }

    #[test]
    fn test_blank_header_columns_dropped() {
        let table = Table::parse("Last,,First, \nDoe,x,Jane,y\n").unwrap();
        assert_eq!(table.headers(), ["Last", "First"]);
        assert_eq!(table.row(0).unwrap().text("First"), "Jane");
    }

    #[test]
    fn test_ragged_rows_read_blank() {
        let table = Table::parse("A,B,C\n1\n").unwrap();
        let row = table.row(0).unwrap();
        assert_eq!(row.get("C"), Some(""));
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn test_aliases_map_to_canonical() {
        let mut table = Table::parse(
            "Emp Last Name,Emp First Name,Roth 401k,401(k),PTO Hours,Gross,Paydate\nDoe,Jane A,75,150,0,2400,2025-09-05\n",
        )
        .unwrap();
        table.rename_by_alias(&SchemaConfig::default().alias_map());
        assert_eq!(
            table.headers(),
            [
                "Employee Last Name",
                "Employee First Name",
                "Roth 401K",
                "401k",
                "Vacation/PTO Hours",
                "Gross Pay",
                "Pay Date"
            ]
        );
        assert_eq!(table.row(0).unwrap().text("Roth 401K"), "75");
    }

    #[test]
    fn test_first_matching_column_wins_and_duplicates_dropped() {
        let mut table = Table::parse("Gross,Gross Pay,Gross Wages\n1,2,3\n").unwrap();
        table.rename_by_alias(&SchemaConfig::default().alias_map());
        assert_eq!(table.headers(), ["Gross Pay", "Gross Wages"]);
        assert_eq!(table.row(0).unwrap().text("Gross Pay"), "1");
    }

    #[test]
    fn test_regular_column_not_renamed_to_hours() {
        let mut table = Table::parse("Regular,Overtime,Reg Hours\n1000.00,50.00,80\n").unwrap();
        table.rename_by_alias(&SchemaConfig::default().alias_map());
        assert_eq!(table.headers(), ["Regular", "Overtime", "Regular Hours"]);
        assert_eq!(table.row(0).unwrap().text("Regular Hours"), "80");
    }

    #[test]
    fn test_rename_is_idempotent() {
        let map = SchemaConfig::default().alias_map();
        let mut once = Table::parse("Emp Last Name,Check Date\nDoe,2025-09-05\n").unwrap();
        once.rename_by_alias(&map);
        let mut twice = once.clone();
        twice.rename_by_alias(&map);
        assert_eq!(once, twice);
    }
}
