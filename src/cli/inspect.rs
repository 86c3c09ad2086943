use std::path::Path;

use colored::Colorize;
use comfy_table::Table as TextTable;

use crate::error::Result;
use crate::header::{detect_header_row, read_text, sniff_delimiter};
use crate::schema::SchemaConfig;
use crate::settings::load_settings;
use crate::table::Table;

fn delimiter_name(delim: u8) -> &'static str {
    match delim {
        b',' => "comma",
        b'\t' => "tab",
        b';' => "semicolon",
        b'|' => "pipe",
        _ => "other",
    }
}

pub fn run(file: &Path, rows: usize) -> Result<()> {
    let settings = load_settings();
    let schema = SchemaConfig::default().with_extra_aliases(&settings.aliases)?;

    let header_row = detect_header_row(file, &schema.header_vocabulary(), settings.header_scan_lines)?;
    let delimiter = sniff_delimiter(&read_text(file)?);
    println!("Detected header row at line: {header_row}");
    println!("Delimiter: {}", delimiter_name(delimiter));

    let mut table = Table::load(file, header_row)?;
    table.rename_by_alias(&schema.alias_map());

    println!("\nColumns parsed (normalized):");
    for column in table.headers() {
        match schema.fields().iter().find(|f| f.name == *column) {
            Some(field) => println!(" - {} {}", column.green(), format!("({})", field.kind.label()).dimmed()),
            None => println!(" - {column}"),
        }
    }
    let missing: Vec<&str> = schema
        .canonical_names()
        .into_iter()
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() {
        println!("{}", format!("Not found: {}", missing.join(", ")).yellow());
    }

    println!("\nFirst {} of {} rows:", rows.min(table.len()), table.len());
    let mut preview = TextTable::new();
    preview.set_header(table.headers().to_vec());
    for row in table.rows().take(rows) {
        preview.add_row(table.headers().iter().map(|h| row.text(h)).collect::<Vec<_>>());
    }
    println!("{preview}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_names() {
        assert_eq!(delimiter_name(b','), "comma");
        assert_eq!(delimiter_name(b'\t'), "tab");
        assert_eq!(delimiter_name(b'#'), "other");
    }

    #[test]
    fn test_inspect_runs_on_padded_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(
            &path,
            "Report\n\nEmp Last Name,Emp First Name,Gross,Paydate\nDoe,Jane A,2400,2025-09-05\n",
        )
        .unwrap();
        assert!(run(&path, 5).is_ok());
    }
}
