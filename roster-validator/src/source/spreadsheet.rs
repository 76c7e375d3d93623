//! Workbook decoding.
//!
//! Reads the first worksheet of an `.xls`/`.xlsx` workbook into rows keyed by
//! the header line:
//! - empty header cells are named `__EMPTY`, repeated names get `_1`, `_2`, ...
//! - every row carries every header column (missing cells are `""`)
//! - rows whose cells are all empty are skipped
//! - cells are rendered with calamine's `Display` (`12`, `12.5`, `true`)

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};

use crate::error::UploadError;
use crate::row::Row;

/// Name given to a header cell with no text.
const EMPTY_HEADER: &str = "__EMPTY";

/// A decoded worksheet: its header and its non-blank data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl DecodedTable {
    /// Build a table from a grid of cell text; the first line is the header.
    #[must_use]
    pub fn from_grid<I>(grid: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut lines = grid.into_iter();
        let Some(header_cells) = lines.next() else {
            return Self::default();
        };
        let header = unique_headers(&header_cells);

        let rows = lines
            .filter_map(|cells| {
                let row: Row = header
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.clone(), cells.get(i).cloned().unwrap_or_default()))
                    .collect();
                (!row.is_blank()).then_some(row)
            })
            .collect();

        Self { header, rows }
    }

    /// Header names after de-duplication.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Columns of the first data row; empty when the table has no data.
    #[must_use]
    pub fn observed_columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map_or_else(Vec::new, |row| row.columns().collect())
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// Decode workbook bytes (format detected from content) into a table.
///
/// # Errors
///
/// Returns [`UploadError::Decode`] if the bytes are not a readable workbook
/// or the workbook has no worksheet.
pub fn decode_workbook(bytes: &[u8]) -> Result<DecodedTable, UploadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| UploadError::Decode(e.to_string()))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(UploadError::Decode("Workbook has no worksheets".to_owned()));
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| UploadError::Decode(format!("Sheet '{sheet_name}' could not be read: {e}")))?;

    let table = DecodedTable::from_grid(
        range
            .rows()
            .map(|cells| cells.iter().map(ToString::to_string).collect()),
    );
    tracing::debug!(
        sheet = %sheet_name,
        columns = table.header.len(),
        rows = table.rows.len(),
        "decoded worksheet"
    );
    Ok(table)
}

fn unique_headers(cells: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    cells
        .iter()
        .map(|cell| {
            let base = if cell.is_empty() { EMPTY_HEADER } else { cell.as_str() };
            let counter = suffixes.entry(base.to_owned()).or_insert(0);
            let mut name = base.to_owned();
            while taken.contains(&name) {
                *counter += 1;
                name = format!("{base}_{counter}");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}
