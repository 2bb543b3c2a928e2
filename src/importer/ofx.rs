use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::Transaction;

use super::{file_access, ParseOptions};

/// Parse an OFX/QFX statement. OFX 1.x is SGML-ish — unclosed value tags,
/// one per line — so a line-oriented tag scan is enough; no column mapping
/// applies because the fields are already named. A statement with no
/// transaction list yields an empty sequence, not an error.
pub fn parse(file_path: &Path, opts: &ParseOptions) -> Result<Vec<Transaction>> {
    let data = std::fs::read(file_path).map_err(|e| file_access(file_path, e))?;
    let content = String::from_utf8_lossy(&data);
    let source = format!("ofx:{}", file_path.display());
    Ok(parse_content(&content, opts, &source))
}

#[derive(Default)]
struct BuildingTrx {
    date: Option<NaiveDateTime>,
    amount: Option<f64>,
    name: Option<String>,
    payee: Option<String>,
    memo: Option<String>,
}

fn parse_content(content: &str, opts: &ParseOptions, source: &str) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut current: Option<BuildingTrx> = None;

    for line in content.lines() {
        let line = line.trim();
        let Some(tag) = line.strip_prefix('<') else {
            continue;
        };
        let (tag_name, value) = match tag.split_once('>') {
            Some((name, val)) => (name.trim(), val.trim()),
            None => (tag.trim_end_matches(['>', '\r']), ""),
        };

        match tag_name.to_uppercase().as_str() {
            "STMTTRN" => current = Some(BuildingTrx::default()),
            "/STMTTRN" => {
                if let Some(trx) = current.take() {
                    if let Some(txn) = finish(trx, opts, source) {
                        transactions.push(txn);
                    }
                }
            }
            other => {
                let Some(ref mut trx) = current else { continue };
                if value.is_empty() {
                    continue;
                }
                match other {
                    "DTPOSTED" => trx.date = parse_ofx_date(value),
                    "TRNAMT" => trx.amount = parse_ofx_amount(value),
                    "NAME" => trx.name = Some(value.to_string()),
                    "PAYEE" => trx.payee = Some(value.to_string()),
                    "MEMO" => trx.memo = Some(value.to_string()),
                    _ => {}
                }
            }
        }
    }

    transactions
}

/// A block missing its date or amount is dropped, mirroring the row-skip
/// behavior of the tabular parsers.
fn finish(trx: BuildingTrx, opts: &ParseOptions, source: &str) -> Option<Transaction> {
    let date = trx.date?;
    let mut amount = trx.amount?;
    if opts.invert_negative && amount < 0.0 {
        amount = amount.abs();
    }
    let description = trx
        .payee
        .or(trx.name)
        .or(trx.memo)
        .unwrap_or_else(|| "Unknown".to_string());
    Some(Transaction::new(date, amount, description, source.to_string()))
}

/// OFX dates look like "20240115" or "20240115120000[-5:EST]"; only the
/// leading digits matter.
fn parse_ofx_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() < 8 || !s.is_char_boundary(8) {
        return None;
    }
    let y: i32 = s[0..4].parse().ok()?;
    let m: u32 = s[4..6].parse().ok()?;
    let d: u32 = s[6..8].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(y, m, d)?;
    if s.len() >= 14 && s.is_char_boundary(14) {
        if let (Ok(h), Ok(min), Ok(sec)) = (
            s[8..10].parse::<u32>(),
            s[10..12].parse::<u32>(),
            s[12..14].parse::<u32>(),
        ) {
            if let Some(dt) = date.and_hms_opt(h, min, sec) {
                return Some(dt);
            }
        }
    }
    date.and_hms_opt(0, 0, 0)
}

fn parse_ofx_amount(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', "");
    let value: f64 = s.parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OFX: &str = r#"
OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>USD
<BANKACCTFROM>
<BANKID>123456789
<ACCTID>000112345
<ACCTTYPE>CHECKING
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20240101
<DTEND>20240131
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240115
<TRNAMT>-49.99
<FITID>TXN001
<NAME>AMAZON MARKETPLACE
<MEMO>Online purchase
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240120120000[-5:EST]
<TRNAMT>1500.00
<FITID>TXN002
<NAME>DIRECT DEPOSIT
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
"#;

    #[test]
    fn test_parse_full_statement() {
        let txns = parse_content(SAMPLE_OFX, &ParseOptions::default(), "ofx:t");
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "AMAZON MARKETPLACE");
        assert_eq!(txns[0].amount, -49.99);
        assert_eq!(txns[0].date.format("%Y-%m-%d").to_string(), "2024-01-15");
        assert_eq!(txns[1].amount, 1500.0);
        assert_eq!(txns[1].date.format("%H:%M:%S").to_string(), "12:00:00");
    }

    #[test]
    fn test_empty_container_is_not_an_error() {
        let empty = "<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS>\n<BANKTRANLIST>\n</BANKTRANLIST>\n</STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>";
        let txns = parse_content(empty, &ParseOptions::default(), "ofx:t");
        assert!(txns.is_empty());
    }

    #[test]
    fn test_invert_negative() {
        let opts = ParseOptions {
            invert_negative: true,
            ..Default::default()
        };
        let txns = parse_content(SAMPLE_OFX, &opts, "ofx:t");
        assert_eq!(txns[0].amount, 49.99);
        assert_eq!(txns[1].amount, 1500.0);
    }

    #[test]
    fn test_missing_name_falls_back_to_memo_then_unknown() {
        let memo_only = "<STMTTRN>\n<DTPOSTED>20240115\n<TRNAMT>-5.00\n<MEMO>Card purchase\n</STMTTRN>";
        let txns = parse_content(memo_only, &ParseOptions::default(), "ofx:t");
        assert_eq!(txns[0].description, "Card purchase");

        let bare = "<STMTTRN>\n<DTPOSTED>20240115\n<TRNAMT>-5.00\n</STMTTRN>";
        let txns = parse_content(bare, &ParseOptions::default(), "ofx:t");
        assert_eq!(txns[0].description, "Unknown");
    }

    #[test]
    fn test_block_with_bad_amount_is_dropped() {
        let bad = "<STMTTRN>\n<DTPOSTED>20240115\n<TRNAMT>oops\n<NAME>X\n</STMTTRN>\n<STMTTRN>\n<DTPOSTED>20240116\n<TRNAMT>-1.00\n<NAME>Y\n</STMTTRN>";
        let txns = parse_content(bad, &ParseOptions::default(), "ofx:t");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Y");
    }

    #[test]
    fn test_parse_ofx_date_formats() {
        assert!(parse_ofx_date("20240115").is_some());
        assert!(parse_ofx_date("20240115120000[-5:EST]").is_some());
        assert!(parse_ofx_date("not-a-date").is_none());
        assert!(parse_ofx_date("2024").is_none());
    }

    #[test]
    fn test_parse_missing_file_is_fatal() {
        let err = parse(Path::new("/nonexistent/stmt.ofx"), &ParseOptions::default());
        assert!(err.is_err());
    }
}
