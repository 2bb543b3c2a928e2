use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One categorization rule. List order is significant: rules are evaluated
/// top to bottom and the first full match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub category: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

/// Built-in rules used when no rule file is present or it fails to parse.
pub fn default_rules() -> Vec<CategoryRule> {
    let defaults: &[(&str, &str)] = &[
        ("UBER|LYFT", "Transport"),
        ("SAFEWAY|TRADER JOE|WHOLE FOODS", "Groceries"),
        ("NETFLIX|SPOTIFY|HBO|DISNEY", "Entertainment"),
        ("AMAZON|EBAY", "Shopping"),
        ("PG&E|EVERSOURCE|SCE", "Utilities"),
        ("STARBUCKS|COFFEE|CAFE|PEET'S", "Dining"),
        ("RESTAURANT|DINER|PIZZA|BURGER|SUSHI", "Dining"),
    ];
    defaults
        .iter()
        .map(|(pattern, category)| CategoryRule {
            pattern: pattern.to_string(),
            category: category.to_string(),
            regex: true,
            min_amount: None,
            max_amount: None,
        })
        .collect()
}

enum Matcher {
    /// Upper-cased literal, checked by substring containment.
    Literal(String),
    /// Compiled from the upper-cased pattern, searched against the
    /// upper-cased description.
    Pattern(Regex),
    /// Malformed regex. Never matches, never aborts the other rules.
    Broken,
}

struct CompiledRule {
    rule: CategoryRule,
    matcher: Matcher,
}

pub struct RuleCategorizer {
    rules: Vec<CompiledRule>,
}

impl RuleCategorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let matcher = if rule.regex {
                    match Regex::new(&rule.pattern.to_uppercase()) {
                        Ok(re) => Matcher::Pattern(re),
                        Err(_) => Matcher::Broken,
                    }
                } else {
                    Matcher::Literal(rule.pattern.to_uppercase())
                };
                CompiledRule { rule, matcher }
            })
            .collect();
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_rules())
    }

    /// Load rules from a JSON file, preserving file order. Falls back to the
    /// built-in set when the file is missing or unparseable.
    pub fn from_file(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<Vec<CategoryRule>>(&content).ok());
        match loaded {
            // A file that parses is honored verbatim, even when empty.
            Some(rules) => Self::new(rules),
            None => Self::with_defaults(),
        }
    }

    /// First rule whose amount bounds admit `amount` and whose pattern
    /// matches `description`. No fallback category here; that is the
    /// orchestrator's call.
    pub fn categorize(&self, description: &str, amount: f64) -> Option<&str> {
        let desc_upper = description.to_uppercase();
        for compiled in &self.rules {
            let rule = &compiled.rule;
            if let Some(min) = rule.min_amount {
                if amount < min {
                    continue;
                }
            }
            if let Some(max) = rule.max_amount {
                if amount > max {
                    continue;
                }
            }
            let hit = match &compiled.matcher {
                Matcher::Literal(pat) => desc_upper.contains(pat),
                Matcher::Pattern(re) => re.is_match(&desc_upper),
                Matcher::Broken => false,
            };
            if hit {
                return Some(&rule.category);
            }
        }
        None
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter().map(|c| &c.rule)
    }
}

pub fn save_rules(path: &Path, rules: &[CategoryRule]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(rules)
        .map_err(|e| crate::error::SpendbookError::Other(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
