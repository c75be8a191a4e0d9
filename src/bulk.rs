//! Bulk record parsing.
//!
//! Decodes a CSV-like block of card records, one per line, and validates each
//! one. Records have the form
//!
//! ```text
//! issuer,holder,"number",cvv,expiry
//! ```
//!
//! There is no header row and no quote escaping. Commas inside a double-quoted
//! field do not split it. The issuer column is informational; the issuer in
//! each row is re-derived from the number.
//!
//! # Example
//!
//! ```
//! use cardprobe::bulk::{parse_bulk, BulkSummary};
//!
//! let rows = parse_bulk("visa,Jane Doe,\"4111 1111 1111 1111\",123,12/99\nbroken,row");
//! assert_eq!(rows.len(), 2);
//! assert!(rows[0].verdict.is_valid);
//! assert_eq!(rows[1].holder, "Invalid Row");
//!
//! let summary = BulkSummary::from_rows(&rows);
//! assert_eq!((summary.total, summary.valid, summary.invalid), (2, 1, 1));
//! ```

use crate::bindb::BinRegistry;
use crate::expiry::YearMonth;
use crate::validate::{CardValidator, ValidationVerdict};

/// Fields a record needs: issuer, holder, number, cvv, expiry.
pub const RECORD_FIELDS: usize = 5;

/// Holder reported for rows with too few fields.
pub const INVALID_ROW_HOLDER: &str = "Invalid Row";

/// Number reported for rows with too few fields.
pub const INVALID_ROW_NUMBER: &str = "N/A";

/// One parsed input line with its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BulkRow {
    /// The input line as read.
    pub raw: String,
    /// Holder name from the record.
    pub holder: String,
    /// Card number from the record, unmodified apart from quote stripping.
    pub number: String,
    /// Validation outcome.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub verdict: ValidationVerdict,
}

/// Counts over a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BulkSummary {
    /// Number of rows.
    pub total: usize,
    /// Rows whose verdict is valid.
    pub valid: usize,
    /// Rows whose verdict is invalid.
    pub invalid: usize,
}

impl BulkSummary {
    /// Tallies `rows`.
    pub fn from_rows(rows: &[BulkRow]) -> Self {
        let valid = rows.iter().filter(|row| row.verdict.is_valid).count();
        Self {
            total: rows.len(),
            valid,
            invalid: rows.len() - valid,
        }
    }

    /// Share of valid rows in percent, 0 when empty.
    pub fn valid_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 * 100.0 / self.total as f64
        }
    }
}

/// Parses bulk input against a BIN registry.
#[derive(Debug, Clone, Copy)]
pub struct BulkParser<'a> {
    validator: CardValidator<'a>,
}

impl<'a> BulkParser<'a> {
    /// Creates a parser resolving BINs against `registry`.
    pub fn new(registry: &'a BinRegistry) -> Self {
        Self {
            validator: CardValidator::new(registry),
        }
    }

    /// Parses every non-blank line, validating against the current month.
    pub fn parse(&self, text: &str) -> Vec<BulkRow> {
        self.parse_at(text, YearMonth::current())
    }

    /// Parses every non-blank line with an explicit reference month.
    pub fn parse_at(&self, text: &str, today: YearMonth) -> Vec<BulkRow> {
        let rows: Vec<BulkRow> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.parse_line(line, today))
            .collect();

        let summary = BulkSummary::from_rows(&rows);
        tracing::debug!(
            rows = summary.total,
            valid = summary.valid,
            invalid = summary.invalid,
            "parsed bulk input"
        );
        rows
    }

    /// Parses a single record.
    pub fn parse_line(&self, line: &str, today: YearMonth) -> BulkRow {
        let fields = split_record(line);
        if fields.len() < RECORD_FIELDS {
            return BulkRow {
                raw: line.to_string(),
                holder: INVALID_ROW_HOLDER.to_string(),
                number: INVALID_ROW_NUMBER.to_string(),
                verdict: ValidationVerdict::incomplete_row(fields.len()),
            };
        }

        let holder = clean_field(fields[1]);
        let number = clean_field(fields[2]);
        let cvv = clean_field(fields[3]);
        let expiry = clean_field(fields[4]);

        BulkRow {
            raw: line.to_string(),
            holder: holder.to_string(),
            number: number.to_string(),
            verdict: self.validator.validate_at(number, expiry, cvv, today),
        }
    }
}

impl Default for BulkParser<'static> {
    fn default() -> Self {
        Self::new(BinRegistry::builtin())
    }
}

/// Parses bulk input against the built-in registry and the current month.
pub fn parse_bulk(text: &str) -> Vec<BulkRow> {
    BulkParser::default().parse(text)
}

/// Splits `line` on commas followed by an even number of double quotes.
///
/// Fields are returned untrimmed.
pub fn split_record(line: &str) -> Vec<&str> {
    let mut quotes_right = line.bytes().filter(|&b| b == b'"').count();
    let mut fields = Vec::new();
    let mut start = 0;

    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quotes_right -= 1,
            b',' if quotes_right % 2 == 0 => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Trims a field and removes one leading and one trailing double quote.
pub fn clean_field(field: &str) -> &str {
    let field = field.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Issuer;
    use crate::error::Field;

    const TODAY: YearMonth = YearMonth::new(26, 10);

    fn parse(text: &str) -> Vec<BulkRow> {
        BulkParser::default().parse_at(text, TODAY)
    }

    #[test]
    fn test_split_record() {
        assert_eq!(split_record("a,b,c"), ["a", "b", "c"]);
        assert_eq!(split_record("a,\"1,2\",c"), ["a", "\"1,2\"", "c"]);
        assert_eq!(split_record(""), [""]);
        assert_eq!(split_record("a,,"), ["a", "", ""]);
    }

    #[test]
    fn test_split_with_unbalanced_quote() {
        // The first comma has one quote to its right, the second has none
        assert_eq!(split_record("a,\"b,c"), ["a,\"b", "c"]);
        assert_eq!(split_record("\"a,b,c"), ["\"a", "b", "c"]);
        assert_eq!(split_record("a,b\",c"), ["a,b\"", "c"]);
    }

    #[test]
    fn test_clean_field() {
        assert_eq!(clean_field("  \"4111 1111\"  "), "4111 1111");
        assert_eq!(clean_field("\"\"x\"\""), "\"x\"");
        assert_eq!(clean_field("\""), "");
        assert_eq!(clean_field("plain"), "plain");
    }

    #[test]
    fn test_good_and_incomplete_rows() {
        let rows = parse(
            "visa,JANE DOE,\"4539 1488 0343 6467\",123,12/30\n\
             visa,ONLY,THREE",
        );
        assert_eq!(rows.len(), 2);

        assert!(rows[0].verdict.is_valid);
        assert_eq!(rows[0].holder, "JANE DOE");
        assert_eq!(rows[0].number, "4539 1488 0343 6467");
        assert_eq!(rows[0].verdict.issuer, Issuer::Visa);

        let bad = &rows[1];
        assert!(!bad.verdict.is_valid);
        assert!(!bad.verdict.luhn_valid);
        assert_eq!(bad.holder, "Invalid Row");
        assert_eq!(bad.number, "N/A");
        assert_eq!(bad.raw, "visa,ONLY,THREE");
        assert_eq!(bad.verdict.issuer, Issuer::Unknown);
        assert_eq!(bad.verdict.country, "Unknown");
        assert_eq!(
            bad.verdict.error(Field::Number).map(ToString::to_string).as_deref(),
            Some("Incomplete data row")
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = parse("\n   \nvisa,A,4111111111111111,123,12/30\r\n\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw, "visa,A,4111111111111111,123,12/30");
    }

    #[test]
    fn test_extra_fields_ignored() {
        let rows = parse("x,A,4111111111111111,123,12/30,extra,more");
        assert!(rows[0].verdict.is_valid);
    }

    #[test]
    fn test_row_errors_come_from_validation() {
        let rows = parse("mastercard,B,\"5500 0000 0000 0005\",12,01/20");
        let verdict = &rows[0].verdict;
        assert!(!verdict.is_valid);
        assert!(verdict.error(Field::Cvv).is_some());
        assert!(verdict.error(Field::Expiry).is_some());
    }

    #[test]
    fn test_issuer_column_is_not_trusted() {
        let rows = parse("amex,A,4111111111111111,123,12/30");
        assert_eq!(rows[0].verdict.issuer, Issuer::Visa);
    }

    #[test]
    fn test_summary() {
        let rows = parse("a,b,4111111111111111,123,12/30\na,b,4111111111111112,123,12/30\nshort");
        let summary = BulkSummary::from_rows(&rows);
        assert_eq!(summary, BulkSummary { total: 3, valid: 1, invalid: 2 });
        assert!((summary.valid_percent() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(BulkSummary::from_rows(&[]).valid_percent(), 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }
}
