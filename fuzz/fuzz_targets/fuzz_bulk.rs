//! Fuzz target for bulk record parsing.
//!
//! Tests that parsing never panics and yields one row per non-blank line.

#![no_main]

use libfuzzer_sys::fuzz_target;
use cardprobe::bulk::{split_record, BulkParser, BulkSummary};
use cardprobe::expiry::YearMonth;

fuzz_target!(|data: &str| {
    let rows = BulkParser::default().parse_at(data, YearMonth::new(26, 10));

    let expected = data.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(rows.len(), expected);

    let summary = BulkSummary::from_rows(&rows);
    assert_eq!(summary.valid + summary.invalid, summary.total);

    for line in data.lines() {
        // Splitting never loses characters other than the separating commas
        let fields = split_record(line);
        let rejoined = fields.join(",");
        assert_eq!(rejoined, line);
    }
});
