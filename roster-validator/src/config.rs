//! Configuration types for roster validation.
//!
//! Split into the core validation config (schema, rules, duplicate identity)
//! and the upload config (which files are accepted at all). The pipeline
//! never looks at upload settings.

use crate::rules::RowRule;

/// Media type of `.xlsx` workbooks.
pub const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Media type of legacy `.xls` workbooks.
pub const XLS_MEDIA_TYPE: &str = "application/vnd.ms-excel";

/// The roster columns, in the order the header must list them.
pub const ROSTER_COLUMNS: &[&str] = &["Sl No", "Name", "Class", "Section", "Age", "Attendance"];

/// Columns whose values together identify a student.
pub const ROSTER_DUPLICATE_KEY: &[&str] = &["Name", "Class", "Section"];

/// Core validation config.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidationConfig {
    /// Required columns. The table header must match this list exactly,
    /// and every column is checked for a non-blank value.
    pub expected_columns: Vec<String>,
    /// Cell rules applied after the required-column checks, in order.
    pub format_rules: Vec<RowRule>,
    /// Columns forming the duplicate identity of a row.
    pub duplicate_key: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            expected_columns: ROSTER_COLUMNS.iter().map(|&c| c.to_owned()).collect(),
            format_rules: vec![
                RowRule::contains_digit("Age"),
                RowRule::one_of("Attendance", &["True", "False"]),
            ],
            duplicate_key: ROSTER_DUPLICATE_KEY.iter().map(|&c| c.to_owned()).collect(),
        }
    }
}

impl ValidationConfig {
    /// The full ordered rule pipeline: one required check per expected
    /// column, then the format rules.
    #[must_use]
    pub fn rule_pipeline(&self) -> Vec<RowRule> {
        self.expected_columns
            .iter()
            .map(|column| RowRule::Required {
                column: column.clone(),
            })
            .chain(self.format_rules.iter().cloned())
            .collect()
    }
}

/// Upload acceptance options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct UploadConfig {
    /// Media types accepted for decoding.
    pub accepted_media_types: Vec<String>,
    /// Maximum upload size in bytes (default: 10 MB).
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_media_types: vec![XLSX_MEDIA_TYPE.to_owned(), XLS_MEDIA_TYPE.to_owned()],
            max_file_size: 10_485_760,
        }
    }
}

impl UploadConfig {
    /// Whether `media_type` is accepted. Parameters such as `; charset=`
    /// are ignored and the comparison is case-insensitive.
    #[must_use]
    pub fn accepts(&self, media_type: &str) -> bool {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        self.accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(essence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_order() {
        let names: Vec<String> = ValidationConfig::default()
            .rule_pipeline()
            .iter()
            .map(|r| r.column().to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "Sl No",
                "Name",
                "Class",
                "Section",
                "Age",
                "Attendance",
                "Age",
                "Attendance"
            ]
        );
    }

    #[test]
    fn test_accepts_spreadsheet_types_only() {
        let config = UploadConfig::default();
        assert!(config.accepts(XLSX_MEDIA_TYPE));
        assert!(config.accepts("Application/VND.ms-excel"));
        assert!(config.accepts("application/vnd.ms-excel; charset=binary"));
        assert!(!config.accepts("text/csv"));
        assert!(!config.accepts(""));
    }
}
