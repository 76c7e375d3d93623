//! Per-row rule pipeline.
//!
//! Rules run in list order and each one appends at most one error, so a row
//! can collect several errors and their order is stable.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RowErrorKind, ValidationError};
use crate::row::Row;

/// ASCII digit anywhere in the value.
static DIGIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[0-9]") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid digit regex: {err}"),
});

/// A single cell check.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum RowRule {
    /// The cell must be present and not blank after trimming.
    Required { column: String },
    /// A non-empty cell must contain a match of `pattern`. Empty or absent
    /// cells are left to the `Required` rule.
    Pattern {
        column: String,
        pattern: Regex,
        message: String,
    },
    /// The trimmed cell must equal one of `allowed` exactly (case-sensitive).
    OneOf { column: String, allowed: Vec<String> },
}

impl RowRule {
    /// `"<column> must include a number"` unless the cell contains a digit.
    #[must_use]
    pub fn contains_digit(column: &str) -> Self {
        Self::Pattern {
            column: column.to_owned(),
            pattern: DIGIT_PATTERN.clone(),
            message: format!("{column} must include a number"),
        }
    }

    #[must_use]
    pub fn one_of(column: &str, allowed: &[&str]) -> Self {
        Self::OneOf {
            column: column.to_owned(),
            allowed: allowed.iter().map(|&v| v.to_owned()).collect(),
        }
    }

    /// The column this rule inspects.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Required { column } | Self::Pattern { column, .. } | Self::OneOf { column, .. } => {
                column
            }
        }
    }

    /// Apply the rule to `row`, returning the error it produces, if any.
    #[must_use]
    pub fn check(&self, row: &Row) -> Option<ValidationError> {
        match self {
            Self::Required { column } => {
                let blank = row.get(column).is_none_or(|v| v.trim().is_empty());
                blank.then(|| ValidationError::missing(column))
            }
            Self::Pattern {
                column,
                pattern,
                message,
            } => {
                let value = row.get(column).unwrap_or_default();
                (!value.is_empty() && !pattern.is_match(value))
                    .then(|| ValidationError::new(RowErrorKind::Format, message.clone()))
            }
            Self::OneOf { column, allowed } => {
                let value = row.get(column).unwrap_or_default().trim();
                (!allowed.iter().any(|a| a == value)).then(|| {
                    ValidationError::new(
                        RowErrorKind::Format,
                        format!("{column} must be {}", join_alternatives(allowed)),
                    )
                })
            }
        }
    }
}

/// `A`, `A or B`, `A, B or C`.
fn join_alternatives(values: &[String]) -> String {
    match values.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

/// Run every rule against `row` in order and collect the errors.
#[must_use]
pub fn validate_row(row: &Row, rules: &[RowRule]) -> Vec<ValidationError> {
    rules.iter().filter_map(|rule| rule.check(row)).collect()
}
