use rusqlite::Connection;
use serde_json::json;

use crate::db;
use crate::error::Result;
use crate::models::Expense;

/// Append-only action log backing `undo`. Each row carries enough JSON to
/// reverse the action it records.
pub fn log_add(conn: &Connection, expense_id: i64) -> Result<()> {
    append(conn, "add", json!({ "expense_id": expense_id }))
}

pub fn log_delete(conn: &Connection, expense: &Expense) -> Result<()> {
    append(
        conn,
        "delete",
        json!({
            "timestamp": expense.timestamp,
            "amount": expense.amount,
            "category": expense.category,
            "note": expense.note,
            "source": expense.source,
        }),
    )
}

pub fn log_import(conn: &Connection, expense_ids: &[i64], import_id: i64) -> Result<()> {
    append(
        conn,
        "import",
        json!({ "expense_ids": expense_ids, "import_id": import_id }),
    )
}

fn append(conn: &Connection, action: &str, payload: serde_json::Value) -> Result<()> {
    conn.execute(
        "INSERT INTO history (action, payload) VALUES (?1, ?2)",
        rusqlite::params![action, payload.to_string()],
    )?;
    Ok(())
}

/// Reverse the most recent logged action. Returns a human-readable summary,
/// or None when there is nothing to undo.
pub fn undo_last(conn: &Connection) -> Result<Option<String>> {
    let last: Option<(i64, String, String)> = conn
        .query_row(
            "SELECT id, action, payload FROM history ORDER BY id DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .ok();
    let Some((history_id, action, payload)) = last else {
        return Ok(None);
    };
    let payload: serde_json::Value = serde_json::from_str(&payload)
        .map_err(|e| crate::error::SpendbookError::Other(format!("corrupt history entry: {e}")))?;

    let summary = match action.as_str() {
        "add" => {
            let id = payload["expense_id"].as_i64().unwrap_or(-1);
            db::delete_expense(conn, id)?;
            format!("Removed expense #{id}")
        }
        "delete" => {
            let restored = db::add_expense(
                conn,
                payload["amount"].as_f64().unwrap_or(0.0),
                payload["category"].as_str().unwrap_or(""),
                payload["note"].as_str().unwrap_or(""),
                payload["timestamp"].as_str().unwrap_or(""),
                payload["source"].as_str(),
            )?;
            format!("Restored expense #{} ({})", restored.id, restored.note)
        }
        "import" => {
            let ids: Vec<i64> = payload["expense_ids"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_i64()).collect())
                .unwrap_or_default();
            for id in &ids {
                db::delete_expense(conn, *id)?;
            }
            if let Some(import_id) = payload["import_id"].as_i64() {
                conn.execute("DELETE FROM imports WHERE id = ?1", [import_id])?;
            }
            format!("Reverted import of {} transaction(s)", ids.len())
        }
        other => format!("Unknown action '{other}' skipped"),
    };

    conn.execute("DELETE FROM history WHERE id = ?1", [history_id])?;
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_expense, get_connection, get_expenses, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_undo_add_removes_the_expense() {
        let (_dir, conn) = test_db();
        let e = add_expense(&conn, 5.0, "FOOD", "lunch", "2024-01-15T12:00:00", None).unwrap();
        log_add(&conn, e.id).unwrap();
        let summary = undo_last(&conn).unwrap().unwrap();
        assert!(summary.contains(&format!("#{}", e.id)));
        assert!(get_expenses(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_undo_delete_restores_the_expense() {
        let (_dir, conn) = test_db();
        let e = add_expense(&conn, 5.0, "FOOD", "lunch", "2024-01-15T12:00:00", None).unwrap();
        log_delete(&conn, &e).unwrap();
        crate::db::delete_expense(&conn, e.id).unwrap();

        let summary = undo_last(&conn).unwrap().unwrap();
        assert!(summary.contains("lunch"));
        let all = get_expenses(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 5.0);
        assert_eq!(all[0].category, "FOOD");
    }

    #[test]
    fn test_undo_import_removes_the_batch() {
        let (_dir, conn) = test_db();
        let a = add_expense(&conn, 1.0, "A", "one", "2024-01-01T00:00:00", None).unwrap();
        let b = add_expense(&conn, 2.0, "B", "two", "2024-01-02T00:00:00", None).unwrap();
        conn.execute(
            "INSERT INTO imports (filename, checksum, record_count) VALUES ('f.csv', 'abc', 2)",
            [],
        )
        .unwrap();
        let import_id = conn.last_insert_rowid();
        log_import(&conn, &[a.id, b.id], import_id).unwrap();

        let summary = undo_last(&conn).unwrap().unwrap();
        assert!(summary.contains("2 transaction(s)"));
        assert!(get_expenses(&conn).unwrap().is_empty());
        let imports: i64 = conn
            .query_row("SELECT count(*) FROM imports", [], |r| r.get(0))
            .unwrap();
        assert_eq!(imports, 0);
    }

    #[test]
    fn test_undo_with_empty_history() {
        let (_dir, conn) = test_db();
        assert!(undo_last(&conn).unwrap().is_none());
    }

    #[test]
    fn test_undo_pops_one_action_at_a_time() {
        let (_dir, conn) = test_db();
        let a = add_expense(&conn, 1.0, "A", "one", "2024-01-01T00:00:00", None).unwrap();
        let b = add_expense(&conn, 2.0, "B", "two", "2024-01-02T00:00:00", None).unwrap();
        log_add(&conn, a.id).unwrap();
        log_add(&conn, b.id).unwrap();

        undo_last(&conn).unwrap();
        let remaining = get_expenses(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, a.id);

        undo_last(&conn).unwrap();
        assert!(get_expenses(&conn).unwrap().is_empty());
        assert!(undo_last(&conn).unwrap().is_none());
    }
}
