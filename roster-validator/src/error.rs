//! Error types for roster validation.

use std::fmt;

use serde::ser::{Serialize, Serializer};
use thiserror::Error;

/// An upload-level failure. Any of these rejects the whole upload and no
/// report is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    /// The file's media type is not one of the accepted spreadsheet types.
    #[error("Invalid file type! Please upload a .xls or .xlsx file.")]
    UnsupportedFileType {
        /// The media type that was offered.
        media_type: String,
    },

    /// The decoded table does not have exactly the expected columns.
    #[error("Invalid columns! Expected: {}", expected.join(", "))]
    SchemaMismatch {
        /// Expected columns, in order.
        expected: Vec<String>,
        /// Columns observed on the first data row.
        found: Vec<String>,
    },

    /// The bytes could not be decoded as a workbook.
    #[error("Could not read spreadsheet: {0}")]
    Decode(String),

    /// The upload exceeded the configured size limit.
    #[error("File exceeds maximum size of {limit} bytes")]
    FileTooLarge {
        /// Limit in bytes.
        limit: u64,
    },

    /// The upload could not be read from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Stable machine-readable code, used by the HTTP layer.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::Decode(_) => "DECODE_ERROR",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Failure to add records to the saved-records store.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The report had no valid rows.
    #[error("No valid records to save.")]
    NothingToSave,
}

/// What a row-level error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RowErrorKind {
    /// A required cell is absent or blank.
    Missing,
    /// A cell is present but has the wrong shape.
    Format,
    /// The row repeats the identity of an earlier row.
    Duplicate,
}

/// A single failed rule on one row.
///
/// Serializes as its message only, so reports carry plain strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: RowErrorKind,
    message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(kind: RowErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// `"<column> is missing"`.
    #[must_use]
    pub fn missing(column: &str) -> Self {
        Self::new(RowErrorKind::Missing, format!("{column} is missing"))
    }

    #[must_use]
    pub fn duplicate() -> Self {
        Self::new(RowErrorKind::Duplicate, "Duplicate record")
    }

    #[must_use]
    pub fn kind(&self) -> RowErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_expected_columns() {
        let err = UploadError::SchemaMismatch {
            expected: vec!["Sl No".to_owned(), "Name".to_owned(), "Age".to_owned()],
            found: vec!["Name".to_owned()],
        };
        assert_eq!(err.to_string(), "Invalid columns! Expected: Sl No, Name, Age");
        assert_eq!(err.code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_unsupported_file_type_message() {
        let err = UploadError::UnsupportedFileType {
            media_type: "text/csv".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid file type! Please upload a .xls or .xlsx file."
        );
    }

    #[test]
    fn test_validation_error_serializes_as_message() {
        let err = ValidationError::missing("Section");
        assert_eq!(err.kind(), RowErrorKind::Missing);
        assert_eq!(serde_json::to_string(&err).unwrap(), r#""Section is missing""#);
        assert_eq!(ValidationError::duplicate().to_string(), "Duplicate record");
    }
}
