use chrono::Local;
use colored::Colorize;

use crate::db;
use crate::error::Result;
use crate::history;

use super::open_store;

pub fn run(amount: f64, category: &str, note: &str) -> Result<()> {
    let conn = open_store()?;
    let timestamp = Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    let expense = db::add_expense(&conn, amount, category, note, &timestamp, Some("manual"))?;
    history::log_add(&conn, expense.id)?;
    println!(
        "{} Added: {} - ${:.2}",
        "\u{2714}".green().bold(),
        expense.category,
        amount
    );
    Ok(())
}
