use chrono::Local;

use crate::db;
use crate::error::Result;

use super::open_store;

pub fn run(style: &str) -> Result<()> {
    let conn = open_store()?;
    let today = Local::now().format("%Y-%m-%d").to_string();
    let daily_total: f64 = db::get_expenses(&conn)?
        .iter()
        .filter(|e| e.timestamp.starts_with(&today))
        .map(|e| e.amount)
        .sum();

    match style {
        "json" => println!(
            "{}",
            serde_json::json!({ "text": format!("${daily_total:.2}"), "class": "expense" })
        ),
        _ => println!("Today: ${daily_total:.2}"),
    }
    Ok(())
}
