use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::rules::{default_rules, save_rules, CategoryRule, RuleCategorizer};
use crate::settings::rules_path;

pub fn list() -> Result<()> {
    let categorizer = RuleCategorizer::from_file(&rules_path());
    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Category", "Type", "Min", "Max"]);
    for (i, rule) in categorizer.rules().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.pattern),
            Cell::new(&rule.category),
            Cell::new(if rule.regex { "regex" } else { "contains" }),
            Cell::new(rule.min_amount.map(|v| format!("${v:.2}")).unwrap_or_default()),
            Cell::new(rule.max_amount.map(|v| format!("${v:.2}")).unwrap_or_default()),
        ]);
    }
    println!("Rules (first match wins)\n{table}");
    Ok(())
}

pub fn add(
    pattern: &str,
    category: &str,
    regex: bool,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
) -> Result<()> {
    let path = rules_path();
    // Materialize the built-in set on first edit so the file shows the full
    // evaluation order the engine will use.
    let mut rules: Vec<CategoryRule> = std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_else(default_rules);
    rules.push(CategoryRule {
        pattern: pattern.to_string(),
        category: category.to_string(),
        regex,
        min_amount,
        max_amount,
    });
    save_rules(&path, &rules)?;
    println!(
        "{} Added rule: '{}' \u{2192} {}",
        "\u{2714}".green().bold(),
        pattern,
        category
    );
    Ok(())
}
