//! Error types for release conversion.
//!
//! [`ReleaseError`] covers failures that end a run (missing input, schema
//! mismatch between merged files, I/O). [`FieldError`] is scoped to a single
//! row: the calendar writer logs it and moves on to the next row.

use std::path::PathBuf;

use thiserror::Error;

use crate::row::Column;

/// Errors that abort a conversion run.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("No CSV files found under {}", .0.display())]
    NoCsvFiles(PathBuf),

    #[error(
        "CSV header mismatch in {}: expected [{}], found [{}]; cannot merge inconsistent CSVs",
        .path.display(),
        .expected.join(", "),
        .found.join(", ")
    )]
    HeaderMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("CSV file {} has no header row", .0.display())]
    MissingHeader(PathBuf),

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for run-scoped operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// A single field of a release row failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing field '{0}'")]
    Missing(Column),

    #[error("field '{0}' must not be empty")]
    Empty(Column),

    #[error("one of the date strings '{start}' or '{end}' is not parsable as ISO-8601")]
    UnparsableDate { start: String, end: String },

    #[error("'{value}' is not a valid download URL: {reason}")]
    InvalidUrl { value: String, reason: String },
}

impl FieldError {
    /// The column the failure is attributed to.
    pub fn column(&self) -> Column {
        match self {
            FieldError::Missing(column) | FieldError::Empty(column) => *column,
            FieldError::UnparsableDate { .. } => Column::Date,
            FieldError::InvalidUrl { .. } => Column::Url,
        }
    }
}
