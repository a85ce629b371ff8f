//! Error types for survey-explorer.

use survey_sheet::SheetError;
use thiserror::Error;

/// Result type for survey engine operations.
pub type SurveyResult<T> = Result<T, SurveyError>;

/// Errors that can occur while loading or analysing a survey.
///
/// Every variant is recoverable: the caller can retry with different input.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// The dataset path does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// The dataset could not be parsed or a required table is missing.
    #[error("Load error: {0}")]
    Load(String),

    /// The question id is not in the catalog or the row set.
    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    /// A required string argument was empty or missing.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A schema row could not be turned into a question.
    #[error("Invalid schema for column '{column}': {message}")]
    InvalidSchema { column: String, message: String },

    /// A type-specific operation was called on the wrong question type.
    #[error("Type mismatch for question '{question}': expected {expected}, got {actual}")]
    TypeMismatch {
        question: String,
        expected: String,
        actual: String,
    },

    /// A subset-scoped operation was requested with no active subset.
    #[error("No active subset. Create one first with 'subset <question> <option>'")]
    NoActiveSubset,

    /// Underlying table error.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl SurveyError {
    /// Create a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid-schema error.
    pub fn invalid_schema(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a type-mismatch error.
    pub fn type_mismatch(
        question: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::TypeMismatch {
            question: question.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Reject empty or whitespace-only string arguments.
pub(crate) fn require_non_empty<'a>(value: &'a str, what: &str) -> SurveyResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SurveyError::invalid_argument(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}
