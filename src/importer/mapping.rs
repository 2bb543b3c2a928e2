use std::collections::HashMap;

use crate::error::{Result, SpendbookError};

// Known header aliases per canonical field, highest priority first. Alias
// priority decides ties, not column order: a file with both "Payee" and
// "Description" always maps description -> "Description".
const DATE_ALIASES: &[&str] = &["date", "txn date", "transaction date", "posting date"];
const AMOUNT_ALIASES: &[&str] = &["amount", "amt", "value", "transaction amount"];
const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "desc",
    "payee",
    "merchant",
    "narrative",
    "transaction description",
];

/// A complete mapping from canonical field to source column name. Partial
/// mappings never leave this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: String,
    pub amount: String,
    pub description: String,
}

/// Resolve the three canonical columns. A non-empty caller mapping is used
/// verbatim (no merging with detection); an empty one triggers alias
/// detection against the header row. Unresolvable fields fail loudly rather
/// than guess — wrong column picks are worse than no import for money data.
pub fn resolve(explicit: &HashMap<String, String>, headers: &[String]) -> Result<ColumnMapping> {
    if !explicit.is_empty() {
        return Ok(ColumnMapping {
            date: required(explicit, "date")?,
            amount: required(explicit, "amount")?,
            description: required(explicit, "description")?,
        });
    }
    Ok(ColumnMapping {
        date: detect(headers, DATE_ALIASES)
            .ok_or_else(|| SpendbookError::MappingIncomplete("date".to_string()))?,
        amount: detect(headers, AMOUNT_ALIASES)
            .ok_or_else(|| SpendbookError::MappingIncomplete("amount".to_string()))?,
        description: detect(headers, DESCRIPTION_ALIASES)
            .ok_or_else(|| SpendbookError::MappingIncomplete("description".to_string()))?,
    })
}

fn required(mapping: &HashMap<String, String>, field: &str) -> Result<String> {
    mapping
        .get(field)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| SpendbookError::MappingIncomplete(field.to_string()))
}

fn detect(headers: &[String], aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(hit) = headers.iter().find(|h| h.trim().to_lowercase() == *alias) {
            return Some(hit.trim().to_string());
        }
    }
    None
}
