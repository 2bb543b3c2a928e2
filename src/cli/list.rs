use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;

use super::open_store;

pub fn run(last: usize) -> Result<()> {
    let conn = open_store()?;
    let mut expenses = db::get_expenses(&conn)?;
    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }
    expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Note", "Amount"]);
    for expense in expenses.iter().take(last) {
        table.add_row(vec![
            Cell::new(expense.id),
            Cell::new(display_date(&expense.timestamp)),
            Cell::new(&expense.category),
            Cell::new(&expense.note),
            Cell::new(format!("${:.2}", expense.amount)),
        ]);
    }
    println!("Expense History\n{table}");
    Ok(())
}

fn display_date(timestamp: &str) -> String {
    timestamp.replace('T', " ").chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_trims_seconds() {
        assert_eq!(display_date("2024-01-15T14:30:59"), "2024-01-15 14:30");
        assert_eq!(display_date("2024-01-15"), "2024-01-15");
    }
}
