use std::collections::HashMap;
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{Result, SpendbookError};
use crate::importer::{ImportFormat, ParseOptions};
use crate::models::Transaction;
use crate::pipeline::{self, ImportPlan, ImportRequest, Prepared, FALLBACK_CATEGORY};
use crate::settings::rules_path;

use super::{open_store, read_line};

const PREVIEW_LIMIT: usize = 10;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &str,
    format: Option<&str>,
    mapping: Option<&str>,
    mapping_file: Option<&str>,
    delimiter: &str,
    skip_rows: usize,
    sheet: Option<&str>,
    date_format: Option<&str>,
    skip_duplicates: bool,
    tolerance_days: i64,
    invert_negative: bool,
    preview: bool,
    interactive: bool,
    yes: bool,
) -> Result<()> {
    let format = match format {
        Some(key) => Some(
            ImportFormat::from_key(key)
                .ok_or_else(|| SpendbookError::UnknownFormat(key.to_string()))?,
        ),
        None => None,
    };

    let options = ParseOptions {
        mapping: resolve_mapping(mapping, mapping_file)?,
        delimiter: delimiter.as_bytes().first().copied().unwrap_or(b','),
        skip_rows,
        sheet: sheet.map(|s| s.to_string()),
        date_format: date_format.map(|s| s.to_string()),
        invert_negative,
    };
    let request = ImportRequest {
        file: PathBuf::from(file),
        format,
        options,
        skip_duplicates,
        tolerance_days,
        rules_path: rules_path(),
    };

    let conn = open_store()?;
    let mut plan = match pipeline::prepare_import(&conn, &request)? {
        Prepared::AlreadyImported => {
            println!("This file has already been imported (duplicate checksum).");
            return Ok(());
        }
        Prepared::Ready(plan) => plan,
    };

    if plan.stats.parsed == 0 {
        println!("Nothing to import.");
        return Ok(());
    }

    if preview {
        render_preview(&plan);
        return Ok(());
    }

    if plan.transactions.is_empty() {
        println!(
            "0 new transactions ({} duplicate(s) skipped).",
            plan.stats.duplicates
        );
        return Ok(());
    }

    if interactive {
        review_uncategorized(&mut plan.transactions);
    }

    println!(
        "{} new, {} auto-categorized, {} duplicate(s) skipped",
        plan.stats.new, plan.stats.auto_categorized, plan.stats.duplicates
    );

    if !yes {
        let answer = read_line(&format!(
            "Import {} transaction(s)? [y/N] ",
            plan.transactions.len()
        ));
        if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            println!("Import cancelled.");
            return Ok(());
        }
    }

    let imported = pipeline::persist_plan(&conn, &plan)?;
    println!("{} Imported {} transaction(s)", "\u{2714}".green().bold(), imported);
    Ok(())
}

/// Inline mapping wins over the mapping file; both produce the canonical
/// field -> column-name table the parsers expect.
fn resolve_mapping(
    inline: Option<&str>,
    file: Option<&str>,
) -> Result<HashMap<String, String>> {
    if let Some(raw) = inline {
        let mut mapping = HashMap::new();
        for pair in raw.split(',') {
            let (field, column) = pair.split_once('=').ok_or_else(|| {
                SpendbookError::Other(format!(
                    "Bad mapping entry '{pair}' (expected field=Column)"
                ))
            })?;
            mapping.insert(field.trim().to_lowercase(), column.trim().to_string());
        }
        return Ok(mapping);
    }
    if let Some(path) = file {
        let content =
            std::fs::read_to_string(path).map_err(|e| SpendbookError::FileAccess {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let mapping: HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| SpendbookError::Other(format!("Bad mapping file {path}: {e}")))?;
        return Ok(mapping);
    }
    Ok(HashMap::new())
}

fn render_preview(plan: &ImportPlan) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category"]);
    for txn in plan.transactions.iter().take(PREVIEW_LIMIT) {
        table.add_row(vec![
            Cell::new(txn.date.format("%Y-%m-%d")),
            Cell::new(&txn.description),
            Cell::new(format!("${:.2}", txn.amount)),
            Cell::new(txn.category.as_deref().unwrap_or("-")),
        ]);
    }
    println!("Preview (nothing will be saved)\n{table}");
    if plan.transactions.len() > PREVIEW_LIMIT {
        println!("\u{2026} and {} more", plan.transactions.len() - PREVIEW_LIMIT);
    }
    println!(
        "{} new, {} auto-categorized, {} duplicate(s) skipped",
        plan.stats.new, plan.stats.auto_categorized, plan.stats.duplicates
    );
}

/// Walk the transactions that neither rules nor the classifier could label
/// and ask the operator. Empty input leaves the fallback label to apply at
/// persistence.
fn review_uncategorized(transactions: &mut [Transaction]) {
    for txn in transactions.iter_mut().filter(|t| t.category.is_none()) {
        let answer = read_line(&format!(
            "Category for '{}' (${:.2}) [{}]: ",
            txn.description, txn.amount, FALLBACK_CATEGORY
        ));
        if !answer.is_empty() {
            txn.category = Some(answer);
        }
    }
}
