//! Fuzz target for card formatting.
//!
//! Tests that formatting functions never panic on arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use cardprobe::format;

fuzz_target!(|data: &str| {
    // These should never panic
    let _ = format::format_with_separator(data, "-");
    let _ = format::format_with_separator(data, "");
    let _ = format::split_into_groups(data);

    // Formatting keeps the leading digits, capped at the display maximum
    let digits = format::strip_formatting(data);
    let formatted = format::format_card_number(data);
    let stripped = format::strip_formatting(&formatted);
    let kept = digits.len().min(format::MAX_DISPLAY_DIGITS);
    if digits.len() < 4 {
        assert_eq!(stripped, digits);
    } else {
        assert_eq!(stripped, digits[..kept]);
    }
});
