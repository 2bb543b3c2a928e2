use std::path::PathBuf;

use colored::Colorize;

use crate::db;
use crate::error::{Result, SpendbookError};

use super::open_store;

pub fn run(path: &str) -> Result<()> {
    let conn = open_store()?;
    let expenses = db::get_expenses(&conn)?;
    if expenses.is_empty() {
        println!("No data to export.");
        return Ok(());
    }

    let mut target = PathBuf::from(path);
    if target.is_dir() {
        target = target.join("expenses.csv");
    }
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(SpendbookError::Other(format!(
                "The folder '{}' does not exist",
                parent.display()
            )));
        }
    }

    let mut writer = csv::Writer::from_path(&target)?;
    writer.write_record(["date", "category", "note", "amount"])?;
    for expense in &expenses {
        let amount = format!("{:.2}", expense.amount);
        writer.write_record([
            expense.timestamp.as_str(),
            expense.category.as_str(),
            expense.note.as_str(),
            amount.as_str(),
        ])?;
    }
    writer.flush()?;

    println!(
        "{} Exported {} expense(s) to {}",
        "\u{2714}".green().bold(),
        expenses.len(),
        target.display()
    );
    Ok(())
}
