//! Column-shape check run before any row is looked at.

use crate::error::UploadError;

/// Require `observed` to equal `expected`: same names, same count, same order.
///
/// # Errors
///
/// Returns [`UploadError::SchemaMismatch`] on any difference. An empty
/// `observed` list only passes when `expected` is empty too.
pub fn check_columns<S: AsRef<str>>(observed: &[S], expected: &[String]) -> Result<(), UploadError> {
    let matches = observed.len() == expected.len()
        && observed
            .iter()
            .zip(expected)
            .all(|(seen, want)| seen.as_ref() == want);

    if matches {
        Ok(())
    } else {
        Err(UploadError::SchemaMismatch {
            expected: expected.to_vec(),
            found: observed.iter().map(|c| c.as_ref().to_owned()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROSTER_COLUMNS;

    fn expected() -> Vec<String> {
        ROSTER_COLUMNS.iter().map(|&c| c.to_owned()).collect()
    }

    #[test]
    fn test_exact_match_passes() {
        assert!(check_columns(ROSTER_COLUMNS, &expected()).is_ok());
    }

    #[test]
    fn test_missing_column_fails() {
        let observed = ["Sl No", "Name", "Class", "Age", "Attendance"];
        let err = check_columns(&observed, &expected()).unwrap_err();
        assert!(matches!(err, UploadError::SchemaMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid columns! Expected: Sl No, Name, Class, Section, Age, Attendance"
        );
    }

    #[test]
    fn test_reordered_columns_fail() {
        let observed = ["Name", "Sl No", "Class", "Section", "Age", "Attendance"];
        assert!(check_columns(&observed, &expected()).is_err());
    }

    #[test]
    fn test_extra_column_fails() {
        let observed = ["Sl No", "Name", "Class", "Section", "Age", "Attendance", "Notes"];
        assert!(check_columns(&observed, &expected()).is_err());
    }

    #[test]
    fn test_empty_observed() {
        let none: [&str; 0] = [];
        assert!(check_columns(&none, &expected()).is_err());
        assert!(check_columns(&none, &[]).is_ok());
    }
}
