//! # roster-validator
//!
//! Validation and classification of student roster spreadsheets.
//!
//! The crate separates the **core pipeline** (input-agnostic: column check,
//! row rules, duplicate detection, aggregation) from the **upload source**
//! (media-type gate and `.xls`/`.xlsx` decoding).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use roster_validator::{Upload, UploadConfig, ValidationConfig, validate_upload};
//!
//! let upload_config = UploadConfig::default();
//! let upload = Upload::from_path(Path::new("roster.xlsx"), upload_config.max_file_size).unwrap();
//!
//! let report = validate_upload(&upload, &upload_config, &ValidationConfig::default()).unwrap();
//! println!("Rows: {}", report.summary.total_rows);
//! println!("Valid: {}", report.summary.valid_count);
//! println!("Invalid: {}", report.summary.error_count);
//! println!("Duplicates: {}", report.duplicates.len());
//! ```

mod classifier;
mod config;
mod duplicates;
mod error;
pub mod output;
mod report;
mod row;
mod rules;
mod schema;
mod source;
mod store;

pub use classifier::{RowOutcome, classify_rows};
pub use config::{
    ROSTER_COLUMNS, ROSTER_DUPLICATE_KEY, UploadConfig, ValidationConfig, XLS_MEDIA_TYPE,
    XLSX_MEDIA_TYPE,
};
pub use duplicates::{DuplicateDetector, DuplicateKey};
pub use error::{RowErrorKind, StoreError, UploadError, ValidationError};
pub use report::{
    ClassificationReport, DISPLAY_ROW_OFFSET, DuplicateRecord, ErrorDetail, ROW_NUMBER_KEY,
    ReportSummary, display_row,
};
pub use row::Row;
pub use rules::{RowRule, validate_row};
pub use schema::check_columns;
pub use source::spreadsheet::{DecodedTable, decode_workbook};
pub use source::{UNKNOWN_MEDIA_TYPE, Upload, media_type_for, read_file_bounded};
pub use store::SavedRecords;

/// Check the column shape of a decoded table, then classify its rows.
///
/// # Errors
///
/// Returns [`UploadError::SchemaMismatch`] if the observed columns differ
/// from `config.expected_columns`; no rows are classified in that case.
pub fn validate_table(
    table: &DecodedTable,
    config: &ValidationConfig,
) -> Result<ClassificationReport, UploadError> {
    check_columns(&table.observed_columns(), &config.expected_columns)?;
    Ok(classify_rows(table.rows(), config))
}

/// Validate an uploaded file end to end: media type, size, decoding, column
/// shape, then row classification.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns an error, and no report, if the media type is not accepted, the
/// file is too large, the bytes cannot be decoded, or the columns do not
/// match. Row-level failures never produce an error; they are reported in
/// the returned report.
pub fn validate_upload(
    upload: &Upload,
    upload_config: &UploadConfig,
    config: &ValidationConfig,
) -> Result<ClassificationReport, UploadError> {
    if !upload_config.accepts(&upload.media_type) {
        tracing::warn!(
            file = %upload.file_name,
            media_type = %upload.media_type,
            "rejected upload: unsupported file type"
        );
        return Err(UploadError::UnsupportedFileType {
            media_type: upload.media_type.clone(),
        });
    }

    if upload.bytes.len() as u64 > upload_config.max_file_size {
        return Err(UploadError::FileTooLarge {
            limit: upload_config.max_file_size,
        });
    }

    let table = decode_workbook(&upload.bytes)?;
    let report = validate_table(&table, config).inspect_err(|err| {
        tracing::warn!(file = %upload.file_name, error = %err, "rejected upload");
    })?;

    tracing::info!(
        file = %upload.file_name,
        total = report.summary.total_rows,
        valid = report.summary.valid_count,
        invalid = report.summary.error_count,
        duplicates = report.duplicates.len(),
        "classified upload"
    );
    Ok(report)
}
