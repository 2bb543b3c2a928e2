use std::path::Path;

use crate::error::{Result, SpendbookError};
use crate::models::Transaction;

use super::{file_access, rows_to_transactions, ParseOptions};

/// Parse a delimited-text statement. The file is read as raw records (no
/// header inference by the csv crate) so `skip_rows` can discard bank
/// preamble lines before the real header row.
pub fn parse(file_path: &Path, opts: &ParseOptions) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(file_path).map_err(|e| file_access(file_path, e))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(opts.delimiter)
        .from_reader(std::io::BufReader::new(file));

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        records.push(record.iter().map(|f| f.to_string()).collect());
    }

    let mut it = records.into_iter().skip(opts.skip_rows);
    let headers = it.next().ok_or_else(|| {
        SpendbookError::FileAccess {
            path: file_path.display().to_string(),
            reason: "no header row found".to_string(),
        }
    })?;
    let rows: Vec<Vec<String>> = it.collect();

    let source = format!("csv:{}", file_path.display());
    rows_to_transactions(&headers, &rows, opts, &source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_basic_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n2024-01-15,UBER RIDE,-42.50\n2024-01-16,SAFEWAY,-31.20\n",
        );
        let txns = parse(&path, &ParseOptions::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "UBER RIDE");
        assert_eq!(txns[0].amount, -42.50);
        assert!(txns[0].source.starts_with("csv:"));
        assert!(txns[0].source.ends_with("stmt.csv"));
    }

    #[test]
    fn test_parse_invert_negative_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n2024-01-15,UBER RIDE,-42.50\n",
        );
        let opts = ParseOptions {
            invert_negative: true,
            ..Default::default()
        };
        let txns = parse(&path, &opts).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, 42.50);
        assert_eq!(txns[0].description, "UBER RIDE");
    }

    #[test]
    fn test_parse_skip_rows_past_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Account Name: Checking\nStatement Period: January\nDate,Description,Amount\n2024-01-15,COFFEE,-5.00\n",
        );
        let opts = ParseOptions {
            skip_rows: 2,
            ..Default::default()
        };
        let txns = parse(&path, &opts).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "COFFEE");
    }

    #[test]
    fn test_parse_semicolon_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Date;Description;Amount\n2024-01-15;BAKERY;-3.75\n",
        );
        let opts = ParseOptions {
            delimiter: b';',
            ..Default::default()
        };
        let txns = parse(&path, &opts).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, -3.75);
    }

    #[test]
    fn test_parse_drops_unconvertible_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n2024-01-15,GOOD,-1.00\nnot-a-date,BAD,-2.00\n2024-01-17,ALSO BAD,N/A\n",
        );
        let txns = parse(&path, &ParseOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "GOOD");
    }

    #[test]
    fn test_parse_missing_file_is_fatal() {
        let err = parse(Path::new("/nonexistent/stmt.csv"), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SpendbookError::FileAccess { .. }));
    }

    #[test]
    fn test_parse_empty_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", "");
        let err = parse(&path, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SpendbookError::FileAccess { .. }));
    }

    #[test]
    fn test_parse_quoted_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n2024-01-31,MOBILE DEPOSIT,\"2,000.00\"\n",
        );
        let txns = parse(&path, &ParseOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, 2000.0);
    }
}
