//! Error types for the yield pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for yield pipeline operations.
pub type Result<T> = std::result::Result<T, YieldError>;

/// Fatal conditions of one pipeline invocation.
///
/// A malformed cell value is deliberately not represented here: it makes
/// the affected record incomplete, and incomplete records are dropped
/// during cleaning rather than aborting the run.
#[derive(Debug, Error)]
pub enum YieldError {
    /// The input workbook does not exist.
    #[error("input workbook not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The requested worksheet is not in the workbook.
    #[error("worksheet {name:?} not found; workbook contains {available:?}")]
    SheetNotFound {
        name: String,
        available: Vec<String>,
    },

    /// A required column is missing from the header row.
    #[error("required column {column:?} missing from header row; found {present:?}")]
    SchemaMismatch {
        column: String,
        present: Vec<String>,
    },

    /// Workbook reading failed below the schema level.
    #[error("failed to read workbook: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// Workbook writing failed.
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON report serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
