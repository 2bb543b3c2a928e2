use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Budget, Expense};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    timestamp TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    source TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budgets (
    category TEXT PRIMARY KEY,
    monthly_limit REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT,
    record_count INTEGER,
    imported_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY,
    action TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insert one expense. Categories are stored upper-cased so rule output,
/// manual entry, and classifier predictions collapse to one spelling.
pub fn add_expense(
    conn: &Connection,
    amount: f64,
    category: &str,
    note: &str,
    timestamp: &str,
    source: Option<&str>,
) -> Result<Expense> {
    conn.execute(
        "INSERT INTO expenses (timestamp, amount, category, note, source) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![timestamp, amount, category.to_uppercase(), note, source],
    )?;
    let id = conn.last_insert_rowid();
    Ok(Expense {
        id,
        timestamp: timestamp.to_string(),
        amount,
        category: category.to_uppercase(),
        note: note.to_string(),
        source: source.map(|s| s.to_string()),
    })
}

pub fn get_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, amount, category, note, source FROM expenses ORDER BY timestamp",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Expense {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                amount: row.get(2)?,
                category: row.get(3)?,
                note: row.get(4)?,
                source: row.get(5)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(rows)
}

pub fn get_expense(conn: &Connection, id: i64) -> Result<Option<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, amount, category, note, source FROM expenses WHERE id = ?1",
    )?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(Expense {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            note: row.get(4)?,
            source: row.get(5)?,
        })),
        None => Ok(None),
    }
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

pub fn clear_expenses(conn: &Connection) -> Result<usize> {
    let changed = conn.execute("DELETE FROM expenses", [])?;
    Ok(changed)
}

pub fn set_budget(conn: &Connection, category: &str, monthly_limit: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO budgets (category, monthly_limit) VALUES (?1, ?2) \
         ON CONFLICT(category) DO UPDATE SET monthly_limit = ?2",
        rusqlite::params![category.to_uppercase(), monthly_limit],
    )?;
    Ok(())
}

pub fn get_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt =
        conn.prepare("SELECT category, monthly_limit FROM budgets ORDER BY category")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Budget {
                category: row.get(0)?,
                monthly_limit: row.get(1)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["expenses", "budgets", "imports", "history"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_add_expense_uppercases_category() {
        let (_dir, conn) = test_db();
        let e = add_expense(&conn, 12.5, "groceries", "WHOLE FOODS", "2024-01-15T00:00:00", None)
            .unwrap();
        assert_eq!(e.category, "GROCERIES");
        let stored: String = conn
            .query_row("SELECT category FROM expenses WHERE id = ?1", [e.id], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "GROCERIES");
    }

    #[test]
    fn test_get_expenses_ordered_by_timestamp() {
        let (_dir, conn) = test_db();
        add_expense(&conn, 2.0, "B", "second", "2024-02-01T00:00:00", None).unwrap();
        add_expense(&conn, 1.0, "A", "first", "2024-01-01T00:00:00", None).unwrap();
        let all = get_expenses(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].note, "first");
        assert_eq!(all[1].note, "second");
    }

    #[test]
    fn test_delete_expense() {
        let (_dir, conn) = test_db();
        let e = add_expense(&conn, 5.0, "FOOD", "lunch", "2024-01-15T12:00:00", None).unwrap();
        assert!(delete_expense(&conn, e.id).unwrap());
        assert!(!delete_expense(&conn, e.id).unwrap());
        assert!(get_expense(&conn, e.id).unwrap().is_none());
    }

    #[test]
    fn test_set_budget_upserts() {
        let (_dir, conn) = test_db();
        set_budget(&conn, "food", 300.0).unwrap();
        set_budget(&conn, "FOOD", 450.0).unwrap();
        let budgets = get_budgets(&conn).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].category, "FOOD");
        assert_eq!(budgets[0].monthly_limit, 450.0);
    }
}
