use colored::Colorize;

use crate::db;
use crate::error::Result;

use super::{open_store, read_line};

pub fn run(yes: bool) -> Result<()> {
    if !yes {
        let answer = read_line("Are you sure you want to delete ALL expenses? [y/N] ");
        if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            println!("Cancelled.");
            return Ok(());
        }
    }
    let conn = open_store()?;
    let removed = db::clear_expenses(&conn)?;
    println!("{} Deleted {} expense(s).", "\u{1F4A5}".red(), removed);
    Ok(())
}
