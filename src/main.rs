mod classifier;
mod cli;
mod db;
mod dedup;
mod error;
mod history;
mod importer;
mod models;
mod pipeline;
mod rules;
mod settings;

use clap::Parser;

use cli::{BudgetCommands, Cli, Commands, RulesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            amount,
            category,
            note,
        } => cli::add::run(amount, &category, &note),
        Commands::List { last } => cli::list::run(last),
        Commands::Delete { id } => cli::delete::run(id),
        Commands::Import {
            file,
            format,
            mapping,
            mapping_file,
            delimiter,
            skip_rows,
            sheet,
            date_format,
            skip_duplicates,
            tolerance_days,
            invert_negative,
            preview,
            interactive,
            yes,
        } => cli::import::run(
            &file,
            format.as_deref(),
            mapping.as_deref(),
            mapping_file.as_deref(),
            &delimiter,
            skip_rows,
            sheet.as_deref(),
            date_format.as_deref(),
            skip_duplicates,
            tolerance_days,
            invert_negative,
            preview,
            interactive,
            yes,
        ),
        Commands::Budget { command } => match command {
            BudgetCommands::Set { category, amount } => cli::budget::set(&category, amount),
            BudgetCommands::Status => cli::budget::status(),
        },
        Commands::Rules { command } => match command {
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Add {
                pattern,
                category,
                regex,
                min_amount,
                max_amount,
            } => cli::rules::add(&pattern, &category, regex, min_amount, max_amount),
        },
        Commands::Undo => cli::undo::run(),
        Commands::Export { path } => cli::export::run(&path),
        Commands::Status { style } => cli::status::run(&style),
        Commands::Nuke { yes } => cli::nuke::run(yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
