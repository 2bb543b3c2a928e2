pub mod csv;
pub mod mapping;
pub mod ofx;
pub mod xlsx;

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, SpendbookError};
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Format kinds — enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
    Ofx,
}

impl ImportFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Ofx => "ofx",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "ofx" => Some(Self::Ofx),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "tsv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Xlsx),
            "ofx" | "qfx" => Some(Self::Ofx),
            _ => None,
        }
    }

    pub fn parse(&self, file_path: &Path, opts: &ParseOptions) -> Result<Vec<Transaction>> {
        match self {
            Self::Csv => csv::parse(file_path, opts),
            Self::Xlsx => xlsx::parse(file_path, opts),
            Self::Ofx => ofx::parse(file_path, opts),
        }
    }
}

/// Caller-supplied knobs for one parse run. The mapping is canonical field
/// name -> source column name; empty means auto-detect from the header row.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub mapping: HashMap<String, String>,
    pub delimiter: u8,
    pub skip_rows: usize,
    pub sheet: Option<String>,
    pub date_format: Option<String>,
    pub invert_negative: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mapping: HashMap::new(),
            delimiter: b',',
            skip_rows: 0,
            sheet: None,
            date_format: None,
            invert_negative: false,
        }
    }
}

pub(crate) fn file_access(path: &Path, err: impl std::fmt::Display) -> SpendbookError {
    SpendbookError::FileAccess {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%y",
];

/// Convert a source date string to a timestamp. An explicit format (if given)
/// is authoritative; otherwise a fixed list of common bank formats is tried
/// in order. Returns None when nothing fits, which drops the row upstream.
pub fn normalize_date(raw: &str, explicit_format: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(fmt) = explicit_format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
        return NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    for fmt in DATE_FORMATS {
        if fmt.contains("%H") {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        } else if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Clean a textual amount: currency symbols, grouping commas, stray quotes,
/// accounting parentheses for negatives. Returns None when no finite number
/// remains.
pub fn parse_amount_text(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    let (s, negative) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

// ---------------------------------------------------------------------------
// Shared row -> Transaction conversion (used by the csv and xlsx parsers)
// ---------------------------------------------------------------------------

/// Turn tabular rows into Transactions given a header row. Column resolution
/// goes through the mapper; a row whose date or amount cannot be normalized
/// is dropped, never fatal.
pub(crate) fn rows_to_transactions(
    headers: &[String],
    rows: &[Vec<String>],
    opts: &ParseOptions,
    source: &str,
) -> Result<Vec<Transaction>> {
    let resolved = mapping::resolve(&opts.mapping, headers)?;
    let idx_date = column_index(headers, &resolved.date)
        .ok_or_else(|| SpendbookError::MappingIncomplete("date".to_string()))?;
    let idx_amount = column_index(headers, &resolved.amount)
        .ok_or_else(|| SpendbookError::MappingIncomplete("amount".to_string()))?;
    let idx_desc = column_index(headers, &resolved.description)
        .ok_or_else(|| SpendbookError::MappingIncomplete("description".to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let Some(date_cell) = row.get(idx_date) else {
            continue;
        };
        let Some(date) = normalize_date(date_cell, opts.date_format.as_deref()) else {
            continue;
        };
        let Some(amount_cell) = row.get(idx_amount) else {
            continue;
        };
        let Some(mut amount) = parse_amount_text(amount_cell) else {
            continue;
        };
        if opts.invert_negative && amount < 0.0 {
            amount = amount.abs();
        }
        let description = row
            .get(idx_desc)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        out.push(Transaction::new(date, amount, description, source.to_string()));
    }
    Ok(out)
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}
