//! Decoded spreadsheet rows.

use indexmap::IndexMap;
use serde::Serialize;

/// One decoded record: column name to cell text, kept in header order.
///
/// Rows are produced by the decoder and never modified by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, String>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. Overwriting a column keeps its original position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Cell text for `column`, or `None` when the row has no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is the empty string. Whitespace counts as content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(String::is_empty)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position_on_overwrite() {
        let mut row = Row::new();
        row.insert("Name", "Asha");
        row.insert("Class", "5");
        row.insert("Name", "Ravi");

        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs, vec![("Name", "Ravi"), ("Class", "5")]);
    }

    #[test]
    fn test_collect_keeps_last_value_at_first_position() {
        let row: Row = [("Name", "Asha"), ("Age", "9"), ("Name", "Ravi")]
            .into_iter()
            .collect();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Name", "Age"]);
        assert_eq!(row.get("Name"), Some("Ravi"));
        assert_eq!(row.get("Class"), None);
    }

    #[test]
    fn test_blank_row() {
        let row: Row = [("Name", ""), ("Class", "")].into_iter().collect();
        assert!(row.is_blank());

        let row: Row = [("Name", "  "), ("Class", "")].into_iter().collect();
        assert!(!row.is_blank());
    }

    #[test]
    fn test_serializes_in_header_order() {
        let row: Row = [("Sl No", "1"), ("Name", "Asha"), ("Age", "9")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Sl No":"1","Name":"Asha","Age":"9"}"#);
    }
}
