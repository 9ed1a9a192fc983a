use std::path::PathBuf;

use thiserror::Error;

/// All errors produced while loading, filtering and exporting reports.
#[derive(Error, Debug)]
pub enum RtlocsumError {
    /// The report or mapping file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file exists but could not be opened or read.
    #[error("Failed to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the input (bad quoting, invalid UTF-8, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A data row did not match the expected schema.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: u64, message: String },

    /// No header row could be located in the report.
    #[error("No header row found: {0}")]
    MissingHeader(String),

    /// A required column is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A record's measurement values do not line up with the table columns.
    #[error("Record for {location} has {found} measurements, table has {expected} columns")]
    MeasurementCount {
        location: String,
        expected: usize,
        found: usize,
    },

    /// The asset filter matched zero records.
    #[error("No records matched assets: {}", assets.join(", "))]
    EmptyResult { assets: Vec<String> },

    /// An option value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RtlocsumError {
    /// Whether this error means the report content is malformed, as opposed
    /// to an I/O or configuration failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            RtlocsumError::Parse { .. }
                | RtlocsumError::MissingHeader(_)
                | RtlocsumError::MissingColumn(_)
                | RtlocsumError::Csv(_)
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RtlocsumError>;
