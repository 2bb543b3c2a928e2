use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;

use super::open_store;

pub fn set(category: &str, amount: f64) -> Result<()> {
    let conn = open_store()?;
    db::set_budget(&conn, category, amount)?;
    println!(
        "{} Budget for {}: ${:.2}/month",
        "\u{2714}".green().bold(),
        category.to_uppercase(),
        amount
    );
    Ok(())
}

pub fn status() -> Result<()> {
    let conn = open_store()?;
    let budgets = db::get_budgets(&conn)?;
    if budgets.is_empty() {
        println!("No budgets set. Use 'spendbook budget set <category> <amount>'.");
        return Ok(());
    }

    let month_prefix = Local::now().format("%Y-%m").to_string();
    let expenses = db::get_expenses(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Limit", "Spent", "Remaining"]);
    for budget in &budgets {
        let spent: f64 = expenses
            .iter()
            .filter(|e| e.category == budget.category && e.timestamp.starts_with(&month_prefix))
            .map(|e| e.amount)
            .sum();
        let remaining = budget.monthly_limit - spent;
        let remaining_cell = if remaining < 0.0 {
            Cell::new(format!("${remaining:.2} OVER"))
        } else {
            Cell::new(format!("${remaining:.2}"))
        };
        table.add_row(vec![
            Cell::new(&budget.category),
            Cell::new(format!("${:.2}", budget.monthly_limit)),
            Cell::new(format!("${spent:.2}")),
            remaining_cell,
        ]);
        if remaining < 0.0 {
            println!(
                "{} {} is over budget",
                "!".red().bold(),
                budget.category
            );
        }
    }
    println!("Budgets for {month_prefix}\n{table}");
    Ok(())
}
