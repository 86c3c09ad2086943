use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayfillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Roster not found: {0}")]
    RosterNotFound(String),

    #[error("Could not detect a header row in {}", .0.display())]
    HeaderNotFound(PathBuf),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Schema config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PayfillError>;
