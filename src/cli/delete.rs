use colored::Colorize;

use crate::db;
use crate::error::{Result, SpendbookError};
use crate::history;

use super::open_store;

pub fn run(id: i64) -> Result<()> {
    let conn = open_store()?;
    let Some(expense) = db::get_expense(&conn, id)? else {
        return Err(SpendbookError::Other(format!("No expense with ID {id}")));
    };
    history::log_delete(&conn, &expense)?;
    db::delete_expense(&conn, id)?;
    println!(
        "{} {} - ${:.2}",
        "Deleted:".red().bold(),
        expense.note,
        expense.amount
    );
    Ok(())
}
