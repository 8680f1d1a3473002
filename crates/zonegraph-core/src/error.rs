//! Centralized error types for zone loading.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for reading and parsing zone data.
#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("Missing expected column: {column}")]
    MissingColumn { column: String },

    #[error("CSV header is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Error parsing {field}: '{value}' is not a valid integer")]
    InvalidInteger {
        field: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Row has {found} cells, header has {expected}")]
    RowArity { expected: usize, found: usize },

    #[error("Failed to parse zone at row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<ZoneError>,
    },

    #[error("Failed to open CSV file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV source has no header row")]
    EmptySource,

    #[error("Failed to read CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid adjacency table: {0}")]
    Adjacency(String),
}

/// Result type for zone operations.
pub type ZoneResult<T> = Result<T, ZoneError>;

impl ZoneError {
    /// Create a missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Attach the 1-based data row number to a row-level failure.
    pub fn at_row(self, row: usize) -> Self {
        Self::Row {
            row,
            source: Box::new(self),
        }
    }

    /// The column name this error is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column } => Some(column),
            Self::InvalidInteger { field, .. } => Some(field),
            Self::Row { source, .. } => source.field(),
            _ => None,
        }
    }
}
