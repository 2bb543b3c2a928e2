use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendbookError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read {path}: {reason}")]
    FileAccess { path: String, reason: String },

    #[error("Cannot determine import format for '{0}' (pass --format)")]
    UnknownFormat(String),

    #[error("Could not resolve required column '{0}' (pass --mapping or fix the header row)")]
    MappingIncomplete(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SpendbookError>;
