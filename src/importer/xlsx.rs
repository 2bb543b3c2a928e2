use std::path::Path;

use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::Transaction;

use super::{file_access, rows_to_transactions, ParseOptions};

/// Parse a spreadsheet statement. Cells are stringified and handed to the
/// same row converter the delimited-text parser uses, so column mapping and
/// row normalization behave identically across both formats.
pub fn parse(file_path: &Path, opts: &ParseOptions) -> Result<Vec<Transaction>> {
    let mut workbook =
        calamine::open_workbook_auto(file_path).map_err(|e| file_access(file_path, e))?;

    let sheet_name = match &opts.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| file_access(file_path, "workbook has no sheets"))?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| file_access(file_path, format!("sheet '{sheet_name}': {e}")))?;

    let mut rows_iter = range.rows().skip(opts.skip_rows);
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| file_access(file_path, "no header row found"))?
        .iter()
        .map(cell_to_string)
        .collect();
    let rows: Vec<Vec<String>> = rows_iter
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();

    let source = format!("xlsx:{}", file_path.display());
    rows_to_transactions(&headers, &rows, opts, &source)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

/// Excel serial date to timestamp. Epoch is 1899-12-30, which absorbs the
/// historical 1900 leap-year bug; the fractional part carries time of day.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // Anything outside a sane calendar span is not a date cell.
    if !serial.is_finite() || !(0.0..3_000_000.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base + chrono::Duration::days(serial.trunc() as i64);
    let secs = (serial.fract() * 86_400.0).round() as u32;
    date.and_hms_opt(secs / 3600, (secs / 60) % 60, secs % 60)
}
