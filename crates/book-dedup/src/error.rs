use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' is missing from the table")]
    MissingColumn { column: String },

    #[error("header row {header_row} is beyond the end of the input ({row_count} rows)")]
    HeaderRowOutOfRange { header_row: usize, row_count: usize },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
