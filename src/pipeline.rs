use std::path::{Path, PathBuf};

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::classifier::TextClassifier;
use crate::dedup::DuplicateDetector;
use crate::db;
use crate::error::{Result, SpendbookError};
use crate::history;
use crate::importer::{ImportFormat, ParseOptions};
use crate::models::Transaction;
use crate::rules::RuleCategorizer;

/// Applied at persistence time to anything still uncategorized.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

pub struct ImportRequest {
    pub file: PathBuf,
    pub format: Option<ImportFormat>,
    pub options: ParseOptions,
    pub skip_duplicates: bool,
    pub tolerance_days: i64,
    pub rules_path: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub parsed: usize,
    pub new: usize,
    pub duplicates: usize,
    pub auto_categorized: usize,
}

#[derive(Debug)]
pub struct ImportPlan {
    pub transactions: Vec<Transaction>,
    pub stats: ImportStats,
    pub filename: String,
    pub checksum: String,
}

#[derive(Debug)]
pub enum Prepared {
    /// This exact file (by checksum) was imported before.
    AlreadyImported,
    Ready(ImportPlan),
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path).map_err(|e| SpendbookError::FileAccess {
        path: file_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Run the read-only half of an import: parse, filter duplicates, and
/// categorize. Nothing touches the store until `persist_plan`, so a preview
/// or an abandoned confirmation has no side effects.
pub fn prepare_import(conn: &Connection, req: &ImportRequest) -> Result<Prepared> {
    let format = req
        .format
        .or_else(|| ImportFormat::from_extension(&req.file))
        .ok_or_else(|| SpendbookError::UnknownFormat(req.file.display().to_string()))?;

    let checksum = compute_checksum(&req.file)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists(rusqlite::params![checksum])? {
            return Ok(Prepared::AlreadyImported);
        }
    }

    let filename = req
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    let mut transactions = format.parse(&req.file, &req.options)?;
    let mut stats = ImportStats {
        parsed: transactions.len(),
        ..Default::default()
    };
    if transactions.is_empty() {
        return Ok(Prepared::Ready(ImportPlan {
            transactions,
            stats,
            filename,
            checksum,
        }));
    }

    // One snapshot feeds both deduplication and classifier training; the
    // store is not re-queried mid-run.
    let existing = db::get_expenses(conn)?;
    let labeled: Vec<(String, String)> = existing
        .iter()
        .filter(|e| !e.category.is_empty() && e.category != FALLBACK_CATEGORY.to_uppercase())
        .map(|e| (e.note.clone(), e.category.clone()))
        .collect();

    if req.skip_duplicates {
        let detector = DuplicateDetector::new(existing);
        let before = transactions.len();
        transactions.retain(|t| !detector.is_duplicate(t, req.tolerance_days));
        stats.duplicates = before - transactions.len();
    }

    let rules = RuleCategorizer::from_file(&req.rules_path);
    let mut classifier = TextClassifier::new();
    classifier.train(&labeled);

    for txn in &mut transactions {
        let category = rules
            .categorize(&txn.description, txn.amount)
            .map(str::to_string)
            .or_else(|| classifier.predict(&txn.description));
        if let Some(cat) = category {
            txn.category = Some(cat);
            stats.auto_categorized += 1;
        }
    }

    stats.new = transactions.len();
    Ok(Prepared::Ready(ImportPlan {
        transactions,
        stats,
        filename,
        checksum,
    }))
}

/// Write a prepared plan to the store: one expense per transaction, an
/// imports row for the file checksum, and a single undoable history entry
/// covering the whole batch.
pub fn persist_plan(conn: &Connection, plan: &ImportPlan) -> Result<usize> {
    let mut ids = Vec::with_capacity(plan.transactions.len());
    for txn in &plan.transactions {
        let category = txn.category.as_deref().unwrap_or(FALLBACK_CATEGORY);
        let timestamp = txn.date.format("%Y-%m-%dT%H:%M:%S").to_string();
        let expense = db::add_expense(
            conn,
            txn.amount,
            category,
            &txn.note,
            &timestamp,
            Some(&txn.source),
        )?;
        ids.push(expense.id);
    }

    conn.execute(
        "INSERT INTO imports (filename, checksum, record_count) VALUES (?1, ?2, ?3)",
        rusqlite::params![plan.filename, plan.checksum, ids.len() as i64],
    )?;
    let import_id = conn.last_insert_rowid();
    history::log_import(conn, &ids, import_id)?;

    Ok(ids.len())
}
