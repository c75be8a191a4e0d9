//! Fuzz target for card validation.
//!
//! Tests that validation never panics and the verdict stays consistent.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use cardprobe::expiry::YearMonth;
use cardprobe::{detect, passes_luhn, CardValidator};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    number: &'a str,
    expiry: &'a str,
    cvv: &'a str,
    year: u8,
    month: u8,
}

fuzz_target!(|input: Input<'_>| {
    let today = YearMonth::new(input.year % 100, input.month % 12 + 1);
    let verdict = CardValidator::default().validate_at(input.number, input.expiry, input.cvv, today);

    assert_eq!(verdict.is_valid, verdict.errors.is_empty());
    assert_eq!(verdict.luhn_valid, passes_luhn(input.number));
    assert_eq!(verdict.issuer, detect::classify_str(input.number));
    if input.expiry.is_empty() {
        assert!(verdict.error(cardprobe::Field::Expiry).is_none());
    }
    if input.cvv.is_empty() {
        assert!(verdict.error(cardprobe::Field::Cvv).is_none());
    }
});
