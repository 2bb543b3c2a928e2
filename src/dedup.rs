use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Expense, Transaction};

/// Amounts within a cent are considered equal — currency rounding noise,
/// not a different purchase.
const AMOUNT_TOLERANCE: f64 = 0.01;

/// Compares candidate transactions against a snapshot of the stored records
/// taken at orchestration start. The snapshot is never re-queried; a run sees
/// one consistent view of the store.
pub struct DuplicateDetector {
    existing: Vec<Expense>,
}

impl DuplicateDetector {
    pub fn new(existing: Vec<Expense>) -> Self {
        Self { existing }
    }

    /// True when some stored record matches on all three of amount,
    /// description, and date window. Bank text gets truncated and embellished
    /// between exports, so description matching is bidirectional substring
    /// containment rather than equality. A stored record whose timestamp does
    /// not parse can never match — over-importing beats silently losing data.
    pub fn is_duplicate(&self, candidate: &Transaction, tolerance_days: i64) -> bool {
        let desc_upper = candidate.description.to_uppercase();

        for exist in &self.existing {
            if (exist.amount - candidate.amount).abs() > AMOUNT_TOLERANCE {
                continue;
            }
            let note_upper = exist.note.to_uppercase();
            if !desc_upper.contains(&note_upper) && !note_upper.contains(&desc_upper) {
                continue;
            }
            let Some(stored_date) = parse_stored_timestamp(&exist.timestamp) else {
                continue;
            };
            let delta = (stored_date.date() - candidate.date.date()).num_days().abs();
            if delta <= tolerance_days {
                return true;
            }
        }
        false
    }
}

fn parse_stored_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    fn stored(amount: f64, note: &str, timestamp: &str) -> Expense {
        Expense {
            id: 1,
            timestamp: timestamp.to_string(),
            amount,
            category: "MISC".to_string(),
            note: note.to_string(),
            source: None,
        }
    }

    fn candidate(amount: f64, description: &str, date: &str) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Transaction::new(date, amount, description.to_string(), "csv:t".to_string())
    }

    #[test]
    fn test_exact_match_is_duplicate() {
        let det = DuplicateDetector::new(vec![stored(42.5, "UBER RIDE", "2024-01-15T00:00:00")]);
        assert!(det.is_duplicate(&candidate(42.5, "UBER RIDE", "2024-01-15"), 1));
    }

    #[test]
    fn test_amount_within_cent_matches() {
        let det = DuplicateDetector::new(vec![stored(42.50, "UBER RIDE", "2024-01-15T00:00:00")]);
        assert!(det.is_duplicate(&candidate(42.51, "UBER RIDE", "2024-01-15"), 1));
    }

    #[test]
    fn test_amount_beyond_cent_never_matches() {
        let det = DuplicateDetector::new(vec![stored(42.50, "UBER RIDE", "2024-01-15T00:00:00")]);
        assert!(!det.is_duplicate(&candidate(42.52, "UBER RIDE", "2024-01-15"), 1));
    }

    #[test]
    fn test_description_containment_both_directions() {
        let det = DuplicateDetector::new(vec![stored(10.0, "UBER", "2024-01-15T00:00:00")]);
        // Candidate text embellished by the bank.
        assert!(det.is_duplicate(&candidate(10.0, "UBER RIDE 123 SAN FRANCISCO", "2024-01-15"), 1));

        let det = DuplicateDetector::new(vec![stored(10.0, "UBER RIDE 123 SAN FRANCISCO", "2024-01-15T00:00:00")]);
        // Candidate text truncated by the bank.
        assert!(det.is_duplicate(&candidate(10.0, "uber ride", "2024-01-15"), 1));
    }

    #[test]
    fn test_unrelated_description_never_matches() {
        let det = DuplicateDetector::new(vec![stored(10.0, "SAFEWAY", "2024-01-15T00:00:00")]);
        assert!(!det.is_duplicate(&candidate(10.0, "UBER RIDE", "2024-01-15"), 1));
    }

    #[test]
    fn test_date_window_inclusive() {
        let det = DuplicateDetector::new(vec![stored(10.0, "UBER", "2024-01-15T00:00:00")]);
        assert!(det.is_duplicate(&candidate(10.0, "UBER", "2024-01-17"), 2));
        assert!(!det.is_duplicate(&candidate(10.0, "UBER", "2024-01-18"), 2));
        // Window applies in both directions.
        assert!(det.is_duplicate(&candidate(10.0, "UBER", "2024-01-13"), 2));
    }

    #[test]
    fn test_unparseable_stored_timestamp_never_matches() {
        let det = DuplicateDetector::new(vec![stored(10.0, "UBER", "garbage")]);
        assert!(!det.is_duplicate(&candidate(10.0, "UBER", "2024-01-15"), 1));
    }

    #[test]
    fn test_stored_date_only_timestamp_matches() {
        let det = DuplicateDetector::new(vec![stored(10.0, "UBER", "2024-01-15")]);
        assert!(det.is_duplicate(&candidate(10.0, "UBER", "2024-01-15"), 0));
    }

    #[test]
    fn test_first_match_short_circuits_over_later_records() {
        let det = DuplicateDetector::new(vec![
            stored(10.0, "SOMETHING ELSE", "2024-01-15T00:00:00"),
            stored(10.0, "UBER", "2024-01-15T00:00:00"),
            stored(10.0, "UBER", "not-a-date"),
        ]);
        assert!(det.is_duplicate(&candidate(10.0, "UBER", "2024-01-15"), 1));
    }

    #[test]
    fn test_empty_snapshot_never_duplicates() {
        let det = DuplicateDetector::new(vec![]);
        assert!(!det.is_duplicate(&candidate(10.0, "UBER", "2024-01-15"), 1));
    }
}
