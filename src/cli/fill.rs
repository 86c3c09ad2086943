use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table as TextTable};
use dialoguer::{Confirm, Input};
use tracing::{debug, info};

use crate::cli::FillArgs;
use crate::error::{PayfillError, Result};
use crate::fmt::{hours, money};
use crate::header::detect_header_row;
use crate::mapper::apply_field_mapping;
use crate::matcher::{match_roster, summarize};
use crate::models::MappedRecord;
use crate::output::{
    archive_input, group_by_check_date, run_stamp, write_unmatched_report, write_uploads, BucketKey,
    Totals,
};
use crate::roster::{load_roster, resolve_roster_path};
use crate::schema::{SchemaConfig, REQUIRED_COLUMNS};
use crate::settings::load_settings;
use crate::table::Table;

/// The yes/no gate before anything is written.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| PayfillError::Other(format!("Prompt failed: {e}")))
    }
}

/// Answers yes without asking (`--yes`).
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

pub struct FillOptions {
    pub input: PathBuf,
    pub roster: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub scan_lines: usize,
}

#[derive(Debug)]
pub enum FillOutcome {
    Written {
        uploads: Vec<PathBuf>,
        unmatched_report: Option<PathBuf>,
        archive: PathBuf,
    },
    Declined,
    /// Stopped before doing anything; the reason was already shown.
    Aborted(String),
}

pub fn run(args: FillArgs) -> Result<()> {
    let settings = load_settings();
    let schema = SchemaConfig::default().with_extra_aliases(&settings.aliases)?;

    let input = match args.file {
        Some(file) => file,
        None => prompt_for_path()?,
    };
    let opts = FillOptions {
        input,
        roster: args.roster,
        out_dir: args.out_dir.unwrap_or_else(|| PathBuf::from(&settings.output_dir)),
        archive_dir: args
            .archive_dir
            .unwrap_or_else(|| PathBuf::from(&settings.archive_dir)),
        scan_lines: settings.header_scan_lines,
    };

    let mut confirmer: Box<dyn Confirmer> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirmer)
    };
    match fill(&opts, &schema, confirmer.as_mut())? {
        FillOutcome::Written {
            uploads,
            unmatched_report,
            archive,
        } => debug!(
            uploads = uploads.len(),
            unmatched_report = ?unmatched_report,
            archive = %archive.display(),
            "fill finished"
        ),
        FillOutcome::Declined => debug!("fill declined at confirmation"),
        FillOutcome::Aborted(reason) => debug!(%reason, "fill stopped early"),
    }
    Ok(())
}

fn prompt_for_path() -> Result<PathBuf> {
    let raw: String = Input::new()
        .with_prompt("Drag/paste CSV path")
        .interact_text()
        .map_err(|e| PayfillError::Other(format!("Prompt failed: {e}")))?;
    Ok(PathBuf::from(clean_path_input(&raw)))
}

/// Strip whitespace and the quotes a drag-and-drop path arrives wrapped in.
fn clean_path_input(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn abort(message: String) -> FillOutcome {
    println!("{}", message.red());
    FillOutcome::Aborted(message)
}

/// Run one payroll file through detection, matching, mapping and output.
pub fn fill(opts: &FillOptions, schema: &SchemaConfig, confirmer: &mut dyn Confirmer) -> Result<FillOutcome> {
    if !opts.input.exists() {
        return Ok(abort(format!("File not found: {}", opts.input.display())));
    }
    let roster_path = match resolve_roster_path(opts.roster.as_deref()) {
        Ok(path) => path,
        Err(PayfillError::RosterNotFound(where_)) => {
            return Ok(abort(format!("Roster not found: {where_}")));
        }
        Err(e) => return Err(e),
    };

    let header_row = detect_header_row(&opts.input, &schema.header_vocabulary(), opts.scan_lines)?;
    println!("Detected header row at line: {header_row}");

    let mut table = Table::load(&opts.input, header_row)?;
    table.rename_by_alias(&schema.alias_map());
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        let err = PayfillError::MissingColumns(missing);
        return Ok(abort(format!("{err} (found: {})", table.headers().join(", "))));
    }
    if table.is_empty() {
        println!("{}", "No payroll rows found below the header.".yellow());
    }

    let roster = load_roster(&roster_path)?;
    let matched = match_roster(&roster, &table);
    let summary = summarize(&matched);
    let mapped = apply_field_mapping(&matched);

    println!(
        "\n{} roster employees, {} payroll rows: {} strict, {} loose, {}",
        summary.total(),
        table.len(),
        summary.strict,
        summary.loose,
        if summary.unmatched > 0 {
            format!("{} unmatched", summary.unmatched).yellow().to_string()
        } else {
            "0 unmatched".to_string()
        }
    );

    let groups = group_by_check_date(&mapped);
    print_verification(&groups);

    let prompt = format!("Write {} upload file(s) to {}?", groups.len(), opts.out_dir.display());
    if !confirmer.confirm(&prompt)? {
        println!("{}", "Cancelled. Nothing was written.".yellow());
        return Ok(FillOutcome::Declined);
    }

    let stamp = run_stamp();
    let archive = archive_input(&opts.input, &opts.archive_dir, &stamp)?;
    println!("Archived input to {}", archive.display());

    let uploads = write_uploads(&opts.out_dir, &groups)?;
    for path in &uploads {
        println!("Wrote {}", path.display());
    }
    let unmatched_report = write_unmatched_report(&opts.out_dir, &mapped, &stamp)?;
    if let Some(path) = &unmatched_report {
        println!(
            "{}",
            format!("{} unmatched employee(s) listed in {}", summary.unmatched, path.display()).yellow()
        );
    }

    info!(files = uploads.len(), "fill complete");
    println!("{}", "Done.".green());
    Ok(FillOutcome::Written {
        uploads,
        unmatched_report,
        archive,
    })
}

fn totals_row(label: &str, t: &Totals) -> Vec<Cell> {
    let mut cells = vec![Cell::new(label), Cell::new(t.rows).set_alignment(CellAlignment::Right)];
    for v in [t.gross_pay, t.pretax, t.pretax_catchup, t.roth, t.roth_catchup, t.safe_harbor] {
        cells.push(Cell::new(money(v)).set_alignment(CellAlignment::Right));
    }
    cells.push(Cell::new(hours(t.hours_worked)).set_alignment(CellAlignment::Right));
    cells
}

fn print_verification(groups: &std::collections::BTreeMap<BucketKey, Vec<&MappedRecord>>) {
    let mut table = TextTable::new();
    table.set_header(vec![
        "Pay Date",
        "Rows",
        "Gross Pay",
        "Pretax",
        "Pretax CU",
        "Roth",
        "Roth CU",
        "Safe Harbor",
        "Hours",
    ]);
    let mut grand = Totals::default();
    for (key, records) in groups {
        let totals = Totals::of(records.iter().copied());
        for r in records {
            grand.add(r);
        }
        table.add_row(totals_row(key.name(), &totals));
    }
    table.add_row(totals_row("Total", &grand));
    println!("\nVerification totals\n{table}\n");
}
