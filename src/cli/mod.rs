pub mod fill;
pub mod init;
pub mod inspect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "payfill",
    version,
    about = "Match a payroll export against the employee roster and build upload files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub fill: FillArgs,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FillArgs {
    /// Payroll export to process (prompted for when omitted)
    pub file: Option<PathBuf>,
    /// Roster CSV (default: templates/roster.csv)
    #[arg(long, env = crate::roster::ROSTER_ENV)]
    pub roster: Option<PathBuf>,
    /// Directory for upload files and the unmatched report
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
    /// Directory the input file is archived into
    #[arg(long = "archive-dir")]
    pub archive_dir: Option<PathBuf>,
    /// Write files without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the detected header row, normalized columns and a few rows of an export.
    Inspect {
        /// Payroll export to inspect
        file: PathBuf,
        /// Number of data rows to preview
        #[arg(long, default_value = "5")]
        rows: usize,
    },
    /// Write the settings file, optionally changing output locations.
    Init {
        /// Directory for upload files (default: dist)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Directory for archived inputs (default: data/archive)
        #[arg(long = "archive-dir")]
        archive_dir: Option<String>,
    },
}
