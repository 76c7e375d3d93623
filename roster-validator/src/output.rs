//! Shared output formatting for classification reports.
//!
//! Provides JSON and plain-text formatters for `ClassificationReport`.
//! Plain text only; colour belongs to the CLI.

use std::io::Write;

use crate::error::ValidationError;
use crate::report::ClassificationReport;
use crate::row::Row;

/// Cell value highlighted in tables, keyed by column.
const FLAGGED_CELL: (&str, &str) = ("Attendance", "False");

/// Marker appended to highlighted cells in plain text.
const FLAG_MARKER: &str = " (!)";

/// Format a `ClassificationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ClassificationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ClassificationReport` as human-readable plain text to a writer.
///
/// Sections with nothing to show are left out.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &ClassificationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let summary = &report.summary;

    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  REPORT ON DATA")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  TOTAL REPORTS:    {}", summary.total_rows)?;
    writeln!(writer, "  VALID REPORTS:    {}", summary.valid_count)?;
    writeln!(writer, "  INVALID REPORTS:  {}", summary.error_count)?;
    writeln!(writer)?;

    if !report.valid_data.is_empty() {
        write_section_title(writer, "VALID RECORDS")?;
        let header = header_of(&report.valid_data);
        let lines: Vec<Vec<String>> = report.valid_data.iter().map(row_cells).collect();
        write_table(writer, &header, &lines)?;
        writeln!(writer)?;
    }

    if !report.errors.is_empty() {
        write_section_title(writer, "ERROR REPORTS")?;
        let header = vec!["Row".to_owned(), "Errors".to_owned(), "Data".to_owned()];
        let lines: Vec<Vec<String>> = report
            .errors
            .iter()
            .map(|detail| {
                let errors: Vec<&str> = detail.errors.iter().map(ValidationError::message).collect();
                let data: Vec<String> = detail
                    .data
                    .iter()
                    .map(|(column, value)| format!("{column}: {}", flag(column, value)))
                    .collect();
                vec![detail.row.to_string(), errors.join(", "), data.join("  ")]
            })
            .collect();
        write_table(writer, &header, &lines)?;
        writeln!(writer)?;
    }

    if !report.duplicates.is_empty() {
        write_section_title(writer, "DUPLICATE RECORDS")?;
        let rows: Vec<Row> = report.duplicates.iter().map(|d| d.data.clone()).collect();
        let mut header = vec!["Row".to_owned()];
        header.extend(header_of(&rows));
        let lines: Vec<Vec<String>> = report
            .duplicates
            .iter()
            .map(|dup| {
                let mut line = vec![dup.row.to_string()];
                line.extend(row_cells(&dup.data));
                line
            })
            .collect();
        write_table(writer, &header, &lines)?;
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.is_clean() {
        writeln!(
            writer,
            "\u{2713} All {} row(s) passed validation",
            summary.total_rows
        )?;
    } else {
        writeln!(
            writer,
            "\u{2717} {} invalid row(s) found, {} of them duplicate(s)",
            summary.error_count,
            report.duplicates.len()
        )?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}

fn write_section_title(writer: &mut dyn Write, title: &str) -> anyhow::Result<()> {
    writeln!(writer, "{}", "-".repeat(80))?;
    writeln!(writer, "  {title}")?;
    writeln!(writer, "{}", "-".repeat(80))?;
    Ok(())
}

fn header_of(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map_or_else(Vec::new, |row| row.columns().map(str::to_owned).collect())
}

fn row_cells(row: &Row) -> Vec<String> {
    row.iter().map(|(column, value)| flag(column, value)).collect()
}

fn flag(column: &str, value: &str) -> String {
    if (column, value) == FLAGGED_CELL {
        format!("{value}{FLAG_MARKER}")
    } else {
        value.to_owned()
    }
}

fn write_table(
    writer: &mut dyn Write,
    header: &[String],
    lines: &[Vec<String>],
) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(writer, header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(writer, "{}", rule.join("-+-"))?;
    for line in lines {
        write_table_line(writer, line, &widths)?;
    }
    Ok(())
}

fn write_table_line(writer: &mut dyn Write, cells: &[String], widths: &[usize]) -> anyhow::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(writer, "{}", padded.join(" | ").trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_rows;
    use crate::config::ValidationConfig;

    fn student(sl: &str, name: &str, attendance: &str) -> Row {
        [
            ("Sl No", sl),
            ("Name", name),
            ("Class", "5"),
            ("Section", "A"),
            ("Age", "10"),
            ("Attendance", attendance),
        ]
        .into_iter()
        .collect()
    }

    fn render(rows: &[Row]) -> String {
        let report = classify_rows(rows, &ValidationConfig::default());
        let mut buf = Vec::new();
        write_human(&report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_human_clean_report() {
        let text = render(&[student("1", "Asha", "True"), student("2", "Ravi", "False")]);
        assert!(text.contains("REPORT ON DATA"));
        assert!(text.contains("TOTAL REPORTS:    2"));
        assert!(text.contains("VALID RECORDS"));
        assert!(text.contains("False (!)"));
        assert!(!text.contains("ERROR REPORTS"));
        assert!(!text.contains("DUPLICATE RECORDS"));
        assert!(text.contains("All 2 row(s) passed validation"));
    }

    #[test]
    fn test_human_report_with_errors_and_duplicates() {
        let text = render(&[
            student("1", "Asha", "True"),
            student("2", "", "yes"),
            student("3", "Asha", "True"),
        ]);
        assert!(text.contains("INVALID REPORTS:  2"));
        assert!(text.contains("Name is missing, Attendance must be True or False"));
        assert!(text.contains("DUPLICATE RECORDS"));
        assert!(text.contains("2 invalid row(s) found, 1 of them duplicate(s)"));
    }

    #[test]
    fn test_table_alignment() {
        let mut buf = Vec::new();
        let header = vec!["Row".to_owned(), "Errors".to_owned()];
        let lines = vec![vec!["12".to_owned(), "Age is missing".to_owned()]];
        write_table(&mut buf, &header, &lines).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut out = text.lines();
        assert_eq!(out.next(), Some("Row | Errors"));
        assert_eq!(out.next(), Some("----+---------------"));
        assert_eq!(out.next(), Some("12  | Age is missing"));
    }

    #[test]
    fn test_json_output_contract() {
        let report = classify_rows(&[student("1", "Asha", "True")], &ValidationConfig::default());
        let mut buf = Vec::new();
        write_json(&report, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(json.get("summary").is_some());
        assert!(json.get("errors").is_some());
        assert!(json.get("duplicates").is_some());
        assert_eq!(json["validData"][0]["Name"], "Asha");
    }
}
