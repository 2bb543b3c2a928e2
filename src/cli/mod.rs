pub mod add;
pub mod budget;
pub mod delete;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod nuke;
pub mod rules;
pub mod status;
pub mod undo;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::get_data_dir;

/// Open (and lazily initialize) the database in the configured data dir.
pub(crate) fn open_store() -> Result<Connection> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = get_connection(&data_dir.join("spendbook.db"))?;
    init_db(&conn)?;
    Ok(conn)
}

pub(crate) fn read_line(prompt: &str) -> String {
    use std::io::Write;
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).ok();
    input.trim().to_string()
}

#[derive(Parser)]
#[command(name = "spendbook", about = "Personal expense bookkeeping CLI with bank-statement import.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up spendbook: choose a data directory and initialize the database.
    Init {
        /// Path for spendbook data (default: platform data dir)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record an expense.
    Add {
        /// The expense amount
        #[arg(short, long)]
        amount: f64,
        /// Category (e.g. Groceries, Transport)
        #[arg(short, long)]
        category: String,
        /// Short description
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Show recent expenses.
    List {
        /// Show last N expenses
        #[arg(short, long, default_value_t = 10)]
        last: usize,
    },
    /// Delete an expense by its ID.
    Delete { id: i64 },
    /// Import a bank statement (CSV, XLSX, or OFX) with duplicate detection
    /// and auto-categorization.
    Import {
        /// Path to the statement file
        file: String,
        /// Format: csv, xlsx, or ofx (default: inferred from extension)
        #[arg(long)]
        format: Option<String>,
        /// Column mapping, e.g. date=Posted,amount=Value,description=Payee
        #[arg(long)]
        mapping: Option<String>,
        /// JSON file containing the column mapping
        #[arg(long = "mapping-file")]
        mapping_file: Option<String>,
        /// Field delimiter for delimited-text files
        #[arg(long, default_value = ",")]
        delimiter: String,
        /// Header rows to skip before the real header
        #[arg(long = "skip-rows", default_value_t = 0)]
        skip_rows: usize,
        /// Sheet name for spreadsheet files (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
        /// Explicit date format, e.g. %d.%m.%Y
        #[arg(long = "date-format")]
        date_format: Option<String>,
        /// Drop transactions already present in the store
        #[arg(long = "skip-duplicates")]
        skip_duplicates: bool,
        /// Date window (days) for duplicate matching
        #[arg(long = "tolerance-days", default_value_t = 1)]
        tolerance_days: i64,
        /// Store negative amounts as their absolute value
        #[arg(long = "invert-negative")]
        invert_negative: bool,
        /// Show what would be imported, persist nothing
        #[arg(long)]
        preview: bool,
        /// Prompt for a category on each uncategorized transaction
        #[arg(long)]
        interactive: bool,
        /// Skip the final confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Manage monthly budgets.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Revert the most recent add, delete, or import.
    Undo,
    /// Export all expenses to a CSV file.
    Export {
        /// Path or filename for the CSV
        #[arg(default_value = "export.csv")]
        path: String,
    },
    /// Show today's total.
    Status {
        /// Output style: text or json
        #[arg(short, long, default_value = "text")]
        style: String,
    },
    /// Delete ALL expenses.
    Nuke {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a monthly limit for a category.
    Set { category: String, amount: f64 },
    /// Compare this month's spending against budgets.
    Status,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List the active rule set in evaluation order.
    List,
    /// Append a rule to the rule file.
    Add {
        pattern: String,
        category: String,
        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
        #[arg(long = "min-amount")]
        min_amount: Option<f64>,
        #[arg(long = "max-amount")]
        max_amount: Option<f64>,
    },
}
