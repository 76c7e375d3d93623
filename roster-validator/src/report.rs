//! Classification report types and the aggregator that builds them.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::classifier::RowOutcome;
use crate::error::ValidationError;
use crate::row::Row;

/// Offset from a 0-based data index to the row number a user sees in the
/// spreadsheet: one for the header row, one for 1-based counting.
pub const DISPLAY_ROW_OFFSET: usize = 2;

/// Display row number for the data row at 0-based `idx`.
#[must_use]
pub fn display_row(idx: usize) -> usize {
    idx + DISPLAY_ROW_OFFSET
}

/// Row counts. `valid_count + error_count == total_rows` always holds.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_rows: usize,
    pub valid_count: usize,
    pub error_count: usize,
}

/// An invalid row with the reasons it failed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Display row number.
    pub row: usize,
    /// Errors in rule order, `"Duplicate record"` last when present.
    pub errors: Vec<ValidationError>,
    pub data: Row,
}

/// Key carrying the display row number of a serialized [`DuplicateRecord`].
pub const ROW_NUMBER_KEY: &str = "row";

/// A row whose identity repeats an earlier row. Serialized flat:
/// `{"row": 4, "Sl No": "3", "Name": ...}`.
///
/// A data column that is itself named `row` is written as `row_1` (or the
/// next free `row_n`), so the row number is never shadowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    /// Display row number.
    pub row: usize,
    pub data: Row,
}

impl Serialize for DuplicateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.data.len() + 1))?;
        map.serialize_entry(ROW_NUMBER_KEY, &self.row)?;
        for (column, value) in self.data.iter() {
            if column == ROW_NUMBER_KEY {
                map.serialize_entry(&free_column_name(&self.data, column), value)?;
            } else {
                map.serialize_entry(column, value)?;
            }
        }
        map.end()
    }
}

fn free_column_name(row: &Row, base: &str) -> String {
    (1_usize..)
        .map(|n| format!("{base}_{n}"))
        .find(|name| row.get(name).is_none())
        .unwrap_or_default()
}

/// Result of classifying one table.
///
/// Duplicate rows are counted once in `summary.error_count` (they are
/// always in `errors`) and are additionally listed in `duplicates`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClassificationReport {
    pub summary: ReportSummary,
    pub errors: Vec<ErrorDetail>,
    pub duplicates: Vec<DuplicateRecord>,
    pub valid_data: Vec<Row>,
}

impl ClassificationReport {
    /// Whether every row passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.summary.error_count == 0
    }
}

/// Accumulates row outcomes in input order.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    total_rows: usize,
    errors: Vec<ErrorDetail>,
    duplicates: Vec<DuplicateRecord>,
    valid_data: Vec<Row>,
}

impl ReportBuilder {
    pub fn push(&mut self, idx: usize, row: &Row, outcome: RowOutcome) {
        self.total_rows += 1;
        let row_number = display_row(idx);
        match outcome {
            RowOutcome::Valid => self.valid_data.push(row.clone()),
            RowOutcome::Invalid { errors } => self.errors.push(ErrorDetail {
                row: row_number,
                errors,
                data: row.clone(),
            }),
            RowOutcome::Duplicate { errors, .. } => {
                self.duplicates.push(DuplicateRecord {
                    row: row_number,
                    data: row.clone(),
                });
                self.errors.push(ErrorDetail {
                    row: row_number,
                    errors,
                    data: row.clone(),
                });
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> ClassificationReport {
        ClassificationReport {
            summary: ReportSummary {
                total_rows: self.total_rows,
                valid_count: self.valid_data.len(),
                error_count: self.errors.len(),
            },
            errors: self.errors,
            duplicates: self.duplicates,
            valid_data: self.valid_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(sl: &str, name: &str) -> Row {
        [("Sl No", sl), ("Name", name)].into_iter().collect()
    }

    #[test]
    fn test_builder_partitions_and_counts() {
        let mut builder = ReportBuilder::default();
        builder.push(0, &student("1", "Asha"), RowOutcome::Valid);
        builder.push(
            1,
            &student("2", ""),
            RowOutcome::Invalid {
                errors: vec![ValidationError::missing("Name")],
            },
        );
        builder.push(
            2,
            &student("3", "Asha"),
            RowOutcome::Duplicate {
                errors: vec![ValidationError::duplicate()],
                first_row: 2,
            },
        );
        let report = builder.finish();

        assert_eq!(
            report.summary,
            ReportSummary {
                total_rows: 3,
                valid_count: 1,
                error_count: 2
            }
        );
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].row, 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_json_shape() {
        let mut builder = ReportBuilder::default();
        builder.push(
            0,
            &student("1", "Asha"),
            RowOutcome::Duplicate {
                errors: vec![ValidationError::duplicate()],
                first_row: 2,
            },
        );
        let json = serde_json::to_value(builder.finish()).unwrap();

        assert_eq!(json["summary"]["totalRows"], 1);
        assert_eq!(json["summary"]["validCount"], 0);
        assert_eq!(json["summary"]["errorCount"], 1);
        assert_eq!(json["errors"][0]["errors"][0], "Duplicate record");
        assert_eq!(json["errors"][0]["data"]["Name"], "Asha");
        assert_eq!(json["duplicates"][0]["row"], 2);
        assert_eq!(json["duplicates"][0]["Sl No"], "1");
        assert!(json["validData"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_row_number_is_not_shadowed_by_a_row_column() {
        let data: Row = [("row", "7"), ("row_1", "x"), ("Name", "Asha")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&DuplicateRecord { row: 4, data }).unwrap();
        assert_eq!(json, r#"{"row":4,"row_2":"7","row_1":"x","Name":"Asha"}"#);
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report = ReportBuilder::default().finish();
        assert_eq!(report.summary, ReportSummary::default());
        assert!(report.is_clean());
    }
}
