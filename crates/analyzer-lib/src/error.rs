//! Error types for the analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Fatal errors that abort an analysis run
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Input file missing or unreadable
    #[error("Cannot read input file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but has no usable header
    #[error("Malformed input structure: {0}")]
    MalformedStructure(String),

    /// Bad date, namespace pattern or bucket size supplied by the caller
    #[error("Invalid filter argument: {0}")]
    InvalidFilterArgument(String),

    /// CSV reader/writer failure outside a single data row
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Report could not be written
    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-row parse failure; the row is skipped and the run continues
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: MalformedRow,
}

/// Why a data row could not be turned into an action record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRow {
    #[error("missing value for column '{0}'")]
    MissingField(&'static str),

    #[error("unparseable timestamp '{value}' in column '{column}'")]
    BadTimestamp { column: &'static str, value: String },

    #[error("unparseable number '{value}' in column '{column}'")]
    BadNumber { column: &'static str, value: String },

    #[error("{0}")]
    UnsupportedCommodity(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display() {
        let err = RowError {
            row: 7,
            kind: MalformedRow::BadNumber {
                column: "current_value",
                value: "abc".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "row 7: unparseable number 'abc' in column 'current_value'"
        );
    }

    #[test]
    fn test_invalid_filter_argument_display() {
        let err = AnalyzerError::InvalidFilterArgument("bucket size must be positive".into());
        assert!(err.to_string().contains("bucket size"));
    }
}
