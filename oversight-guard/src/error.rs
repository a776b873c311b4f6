//! Error types for the oversight-guard library.
//!
//! All fallible operations return [`OversightError`] through the [`Result`]
//! alias. Data errors (a missing column, a date that does not parse) and
//! parameter errors (an unknown operator name) are fatal for a query.
//! Detector failures are isolated by the runner in
//! [`crate::oversights::runner`] and never abort the main result.

use thiserror::Error;

/// The main error type for the oversight-guard library.
#[derive(Error, Debug)]
pub enum OversightError {
    /// A referenced column does not exist in the table.
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// Two columns share the same name.
    #[error("Column '{column}' appears more than once")]
    DuplicateColumn { column: String },

    /// A column does not have as many values as the table has rows.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// An operation received values of the wrong semantic type.
    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A date could not be parsed under the supplied day-first convention.
    #[error("Unable to parse date '{value}' (day_first = {day_first})")]
    DateParse { value: String, day_first: bool },

    /// An unrecognised summary operator name.
    #[error("Unknown summary operator: {0}")]
    UnknownSummaryOperator(String),

    /// An unrecognised filter name.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// An unrecognised or unsupported granularity name.
    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    /// A query parameter is out of range or inconsistent with the query.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Error from JSON (de)serialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error while reading configuration from disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, OversightError>`.
pub type Result<T> = std::result::Result<T, OversightError>;

impl OversightError {
    /// Creates a column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a date parse error.
    pub fn date_parse(value: impl Into<String>, day_first: bool) -> Self {
        Self::DateParse {
            value: value.into(),
            day_first,
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the data rather than the caller.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::ColumnNotFound { .. }
                | Self::ColumnLengthMismatch { .. }
                | Self::TypeMismatch { .. }
                | Self::DateParse { .. }
        )
    }
}
