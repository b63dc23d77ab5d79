//! Bank-statement CSV parsing.
//!
//! Statements differ wildly between banks, so header detection is fuzzy:
//! each canonical column is located by a list of known aliases (exact match
//! first, then substring). Debit rows become spending entries; credit rows
//! and unparseable lines are counted as skipped.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// One spending row extracted from a statement
#[derive(Debug, Clone, PartialEq)]
pub struct StatementEntry {
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: f64,
}

/// Parse result: the usable entries plus how many data rows were dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    pub entries: Vec<StatementEntry>,
    pub skipped: usize,
}

const DATE_ALIASES: &[&str] = &[
    "date",
    "transaction date",
    "txn date",
    "value date",
    "posting date",
];
const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "narration",
    "details",
    "merchant",
    "remarks",
    "particulars",
];
const DEBIT_ALIASES: &[&str] = &[
    "debit",
    "debit amount",
    "withdrawal amount",
    "withdrawal amt.",
    "withdrawal",
    "dr",
];
const CREDIT_ALIASES: &[&str] = &[
    "credit",
    "credit amount",
    "deposit amount",
    "deposit amt.",
    "deposit",
    "cr",
];
const AMOUNT_ALIASES: &[&str] = &["amount", "transaction amount", "amt"];
const TYPE_ALIASES: &[&str] = &["type", "transaction type", "dr/cr", "debit/credit", "crdr"];

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
];

fn normalize(value: &str) -> String {
    value.trim().trim_start_matches('\u{feff}').to_lowercase()
}

fn find_column(header: &[String], aliases: &[&str]) -> Option<usize> {
    // exact match wins over a substring match
    for (idx, name) in header.iter().enumerate() {
        if aliases.contains(&name.as_str()) {
            return Some(idx);
        }
    }
    header
        .iter()
        .position(|name| aliases.iter().any(|alias| name.contains(alias)))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.from_utc_datetime(&dt));
        }
    }

    // last resort: full ISO timestamp
    trimmed
        .parse::<DateTime<Utc>>()
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse raw CSV statement content into spending entries.
///
/// Column layout is inferred from the header row. Supported shapes:
/// separate debit/credit columns, or one amount column optionally paired
/// with a dr/cr type column (amount-only statements treat every row as a
/// debit).
pub fn parse_bank_statement(content: &str) -> ParsedStatement {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(normalize).collect(),
        Err(_) => return ParsedStatement::default(),
    };

    let date_idx = find_column(&header, DATE_ALIASES);
    let desc_idx = find_column(&header, DESCRIPTION_ALIASES);
    let debit_idx = find_column(&header, DEBIT_ALIASES);
    let credit_idx = find_column(&header, CREDIT_ALIASES);
    let amount_idx = find_column(&header, AMOUNT_ALIASES);
    let type_idx = find_column(&header, TYPE_ALIASES);

    let mut result = ParsedStatement::default();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => {
                result.skipped += 1;
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let date = match parse_date(field(date_idx)) {
            Some(date) => date,
            None => {
                result.skipped += 1;
                continue;
            }
        };

        let description = field(desc_idx).trim();
        let description = if description.is_empty() {
            "Imported transaction".to_string()
        } else {
            description.to_string()
        };

        // prefer an explicit debit column, then a typed amount column
        let amount = if let Some(debit) = parse_amount(field(debit_idx)) {
            Some(debit)
        } else if debit_idx.is_none() {
            match parse_amount(field(amount_idx)) {
                Some(amount) => {
                    let row_type = normalize(field(type_idx));
                    if type_idx.is_some() && (row_type.contains("cr") || row_type.contains("credit"))
                    {
                        None // credit row
                    } else {
                        Some(amount.abs())
                    }
                }
                None => None,
            }
        } else {
            None // credit-only row in a debit/credit statement
        };

        match amount {
            Some(amount) if amount > 0.0 => result.entries.push(StatementEntry {
                date,
                description,
                amount,
            }),
            // credit rows are not spending; counted so the caller can report
            _ => result.skipped += 1,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_credit_statement() {
        let csv = "\
Date,Narration,Withdrawal Amt.,Deposit Amt.,Ref No
01/06/2025,SWIGGY ORDER,450.00,,UTR123
02/06/2025,SALARY CREDIT,,50000.00,UTR124
03/06/2025,AMAZON,\u{20b9}1299.50,,UTR125
";
        let parsed = parse_bank_statement(csv);

        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.skipped, 1);

        assert_eq!(parsed.entries[0].description, "SWIGGY ORDER");
        assert_eq!(parsed.entries[0].amount, 450.0);
        assert_eq!(
            parsed.entries[0].date,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
        // currency symbols are stripped
        assert_eq!(parsed.entries[1].amount, 1299.5);
    }

    #[test]
    fn test_amount_with_type_column() {
        let csv = "\
Transaction Date,Description,Amount,Dr/Cr
2025-06-01,COFFEE,120.00,DR
2025-06-02,REFUND,300.00,CR
";
        let parsed = parse_bank_statement(csv);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].description, "COFFEE");
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_amount_only_statement_treats_rows_as_debits() {
        let csv = "\
date,details,amt
15 Jun 2025,CHEMIST,89.00
";
        let parsed = parse_bank_statement(csv);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].amount, 89.0);
    }

    #[test]
    fn test_unparseable_rows_are_skipped() {
        let csv = "\
Date,Description,Debit
not-a-date,MYSTERY,100.00
01/06/2025,VALID,50.00
";
        let parsed = parse_bank_statement(csv);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_bank_statement("");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.skipped, 0);
    }
}
