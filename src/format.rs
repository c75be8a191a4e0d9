//! Digit-string handling and display formatting.
//!
//! Card numbers enter the crate as raw user text. Everything that is not an
//! ASCII digit is discarded before any numeric work, and the display form
//! (blocks of four separated by spaces) is purely presentational.
//!
//! # Example
//!
//! ```
//! use cardprobe::format::{format_card_number, format_with_separator, strip_formatting};
//!
//! assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
//! assert_eq!(format_with_separator("4111111111111111", "-"), "4111-1111-1111-1111");
//! assert_eq!(strip_formatting("4111-1111 1111.1111"), "4111111111111111");
//! ```

/// Longest run of digits kept by the display formatter.
pub const MAX_DISPLAY_DIGITS: usize = 19;

/// Shortest run of digits the display formatter will group.
const MIN_GROUPED_DIGITS: usize = 4;

const GROUP_SIZE: usize = 4;

/// Strips everything except ASCII digits.
///
/// This is the canonical digit string every other operation works on.
pub fn strip_formatting(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Converts the ASCII digits of `input` into digit values (`0..=9`).
///
/// Non-digit characters are skipped.
pub fn to_digits(input: &str) -> Vec<u8> {
    input
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect()
}

/// Converts digit values back into an ASCII string.
pub fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|&d| (b'0' + d) as char).collect()
}

/// Formats a card number for display in blocks of four.
///
/// All non-digits are discarded first. Inputs with fewer than four digits are
/// returned as bare digits; longer inputs keep at most the first
/// [`MAX_DISPLAY_DIGITS`] digits.
///
/// # Example
///
/// ```
/// use cardprobe::format::format_card_number;
///
/// assert_eq!(format_card_number("378282246310005"), "3782 8224 6310 005");
/// assert_eq!(format_card_number("12"), "12");
/// ```
pub fn format_card_number(input: &str) -> String {
    format_with_separator(input, " ")
}

/// Formats a card number in blocks of four with a custom separator.
///
/// # Example
///
/// ```
/// use cardprobe::format::format_with_separator;
///
/// assert_eq!(format_with_separator("4111111111111111", " - "), "4111 - 1111 - 1111 - 1111");
/// ```
pub fn format_with_separator(input: &str, separator: &str) -> String {
    let digits = strip_formatting(input);

    if digits.len() < MIN_GROUPED_DIGITS {
        return digits;
    }

    // ASCII only after stripping, so byte slicing is safe
    let run = &digits[..digits.len().min(MAX_DISPLAY_DIGITS)];
    let groups: Vec<&str> = run
        .as_bytes()
        .chunks(GROUP_SIZE)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    groups.join(separator)
}

/// Splits a card number into its display groups.
///
/// # Example
///
/// ```
/// use cardprobe::format::split_into_groups;
///
/// assert_eq!(split_into_groups("4111111111111111"), vec!["4111", "1111", "1111", "1111"]);
/// ```
pub fn split_into_groups(input: &str) -> Vec<String> {
    let formatted = format_card_number(input);
    if formatted.is_empty() {
        return vec![];
    }
    formatted.split(' ').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_16() {
        assert_eq!(
            format_card_number("4111111111111111"),
            "4111 1111 1111 1111"
        );
    }

    #[test]
    fn test_format_13() {
        assert_eq!(format_card_number("4222222222222"), "4222 2222 2222 2");
    }

    #[test]
    fn test_format_amex_uses_plain_blocks() {
        assert_eq!(format_card_number("378282246310005"), "3782 8224 6310 005");
    }

    #[test]
    fn test_format_with_dashes() {
        assert_eq!(
            format_with_separator("4111111111111111", "-"),
            "4111-1111-1111-1111"
        );
    }

    #[test]
    fn test_format_already_formatted() {
        assert_eq!(
            format_card_number("4111-1111-1111-1111"),
            "4111 1111 1111 1111"
        );
        assert_eq!(
            format_card_number("4111 1111 1111 1111"),
            "4111 1111 1111 1111"
        );
    }

    #[test]
    fn test_format_discards_letters_everywhere() {
        assert_eq!(format_card_number("ab4111cd1111"), "4111 1111");
    }

    #[test]
    fn test_format_short_input() {
        assert_eq!(format_card_number(""), "");
        assert_eq!(format_card_number("   "), "");
        assert_eq!(format_card_number("123"), "123");
        assert_eq!(format_card_number("1234"), "1234");
        assert_eq!(format_card_number("12345"), "1234 5");
    }

    #[test]
    fn test_format_caps_at_19_digits() {
        assert_eq!(
            format_card_number("4111111111111111111"),
            "4111 1111 1111 1111 111"
        );
        assert_eq!(
            format_card_number("41111111111111111119999"),
            "4111 1111 1111 1111 111"
        );
    }

    #[test]
    fn test_strip_formatting() {
        assert_eq!(strip_formatting("4111 1111 1111 1111"), "4111111111111111");
        assert_eq!(strip_formatting("4111-1111-1111-1111"), "4111111111111111");
        assert_eq!(strip_formatting("4111.1111.1111.1111"), "4111111111111111");
        assert_eq!(strip_formatting("card: ٤١١١"), "");
    }

    #[test]
    fn test_to_digits_roundtrip() {
        let digits = to_digits("40-56 63");
        assert_eq!(digits, vec![4, 0, 5, 6, 6, 3]);
        assert_eq!(digits_to_string(&digits), "405663");
    }

    #[test]
    fn test_split_into_groups() {
        assert_eq!(
            split_into_groups("4111111111111111"),
            vec!["4111", "1111", "1111", "1111"]
        );
        assert!(split_into_groups("").is_empty());
    }
}
