use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error while reading price data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: cannot parse timestamp '{value}'")]
    BadTimestamp { line: usize, value: String },

    #[error("Line {line}: cannot parse price '{value}' of {asset}")]
    BadNumber {
        line: usize,
        asset: String,
        value: String,
    },

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("The price data does not form a valid panel: {0}")]
    Panel(#[from] CoreError),
}
