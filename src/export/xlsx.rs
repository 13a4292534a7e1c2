//! Spreadsheet rendering: one worksheet per report table, bold headers in the
//! first row, text cells as strings and numeric cells as numbers.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, XlsxError};
use tracing::debug;

use crate::error::{Error, Result};
use crate::report::{CellValue, Report};

/// Excel caps worksheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Turn a table name into a worksheet name Excel accepts, unique within the
/// workbook (compared case-insensitively, as Excel does).
fn sheet_name(table_name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = table_name
        .chars()
        .map(|ch| if FORBIDDEN_SHEET_CHARS.contains(&ch) { '_' } else { ch })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut counter = 2;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({counter})");
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        counter += 1;
    }
    candidate
}

/// Spreadsheet dates only cover the years 1900 to 9999.
fn creation_date(generated: NaiveDate) -> std::result::Result<ExcelDateTime, String> {
    let out_of_range =
        || format!("report date {generated} is outside the 1900-9999 range spreadsheets support");
    let year = u16::try_from(generated.year())
        .ok()
        .filter(|year| (1900..=9999).contains(year))
        .ok_or_else(out_of_range)?;
    // Month and day always fit a byte.
    ExcelDateTime::from_ymd(year, generated.month() as u8, generated.day() as u8)
        .map_err(|_| out_of_range())
}

fn build(report: &Report, created: &ExcelDateTime) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let properties = DocProperties::new()
        .set_title(report.title.as_str())
        .set_creation_datetime(created);
    workbook.set_properties(&properties);

    let header = Format::new().set_bold();
    let mut used = HashSet::new();
    for table in &report.tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&table.name, &mut used))?;

        for (column, label) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, column as u16, label, &header)?;
        }
        for (index, row) in table.rows.iter().enumerate() {
            let row_number = index as u32 + 1;
            for (column, cell) in row.iter().enumerate() {
                match cell {
                    // Nulls stay blank cells.
                    CellValue::Text(text) if text.is_empty() => continue,
                    CellValue::Text(text) => {
                        worksheet.write_string(row_number, column as u16, text)?;
                    }
                    CellValue::Number(number) => {
                        worksheet.write_number(row_number, column as u16, *number)?;
                    }
                }
            }
        }
        worksheet.autofit();
    }

    workbook.save_to_buffer()
}

/// Render the whole report into XLSX bytes. `destination` only labels errors.
pub(super) fn render(report: &Report, destination: &Path) -> Result<Vec<u8>> {
    let created = creation_date(report.generated_at.date())
        .map_err(|reason| Error::export(destination, reason))?;
    let bytes = build(report, &created).map_err(|err| Error::export(destination, err))?;
    debug!(
        "rendered {} worksheet(s), {} bytes",
        report.tables.len(),
        bytes.len()
    );
    Ok(bytes)
}
