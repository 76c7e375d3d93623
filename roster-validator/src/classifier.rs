//! Row classification: rules, then duplicate detection, then aggregation.

use crate::config::ValidationConfig;
use crate::duplicates::DuplicateDetector;
use crate::error::ValidationError;
use crate::report::{ClassificationReport, ReportBuilder, display_row};
use crate::row::Row;
use crate::rules::validate_row;

/// How a single row was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// No rule failed and the row's identity is new.
    Valid,
    /// One or more rules failed.
    Invalid { errors: Vec<ValidationError> },
    /// The identity repeats an earlier row. `errors` holds any rule
    /// failures followed by `"Duplicate record"`.
    Duplicate {
        errors: Vec<ValidationError>,
        /// Display row number of the first occurrence.
        first_row: usize,
    },
}

impl RowOutcome {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Errors attached to the row; empty for `Valid`.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Valid => &[],
            Self::Invalid { errors } | Self::Duplicate { errors, .. } => errors,
        }
    }
}

/// Classify `rows` in input order. The column shape is assumed to be
/// checked already.
///
/// Deterministic: the same rows always produce the same report.
#[must_use]
pub fn classify_rows(rows: &[Row], config: &ValidationConfig) -> ClassificationReport {
    let rules = config.rule_pipeline();
    let mut detector = DuplicateDetector::new(&config.duplicate_key);
    let mut builder = ReportBuilder::default();

    for (idx, row) in rows.iter().enumerate() {
        let mut errors = validate_row(row, &rules);
        let outcome = match detector.observe(idx, row) {
            Some(first_idx) => {
                errors.push(ValidationError::duplicate());
                RowOutcome::Duplicate {
                    errors,
                    first_row: display_row(first_idx),
                }
            }
            None if errors.is_empty() => RowOutcome::Valid,
            None => RowOutcome::Invalid { errors },
        };
        if !outcome.is_valid() {
            tracing::debug!(row = display_row(idx), errors = outcome.errors().len(), "row rejected");
        }
        builder.push(idx, row, outcome);
    }

    builder.finish()
}
