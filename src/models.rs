use chrono::NaiveDateTime;

/// A parsed, not-yet-persisted candidate expense produced by an importer.
/// Has no identity until the store assigns one.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub date: NaiveDateTime,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub note: String,
    /// Provenance tag, e.g. "csv:statement.csv". Audit only, not uniqueness.
    pub source: String,
}

impl Transaction {
    pub fn new(date: NaiveDateTime, amount: f64, description: String, source: String) -> Self {
        let note = description.clone();
        Self {
            date,
            amount,
            description,
            category: None,
            note,
            source,
        }
    }
}

/// A persisted expense record, owned by the store.
#[derive(Debug, Clone)]
pub struct Expense {
    pub id: i64,
    /// ISO timestamp string, e.g. "2024-01-15T00:00:00".
    pub timestamp: String,
    pub amount: f64,
    pub category: String,
    pub note: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Budget {
    pub category: String,
    pub monthly_limit: f64,
}
