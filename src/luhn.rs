//! Luhn checksum engine.
//!
//! The Luhn algorithm ("modulus 10") validates card numbers and produces the
//! trailing check digit used by the generator.
//!
//! Every function here works on digit values (`0..=9`), not ASCII. The
//! `*_str` conveniences strip everything that is not an ASCII digit first.

use crate::format::to_digits;

/// Card numbers shorter than this never pass [`is_checksum_valid`].
pub const MIN_CHECKSUM_DIGITS: usize = 13;

/// Lookup table for doubled digits: double the value, subtract 9 if > 9.
const DOUBLE_TABLE: [u8; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Returns true if `digits` is a checksum-valid card number.
///
/// Numbers with fewer than [`MIN_CHECKSUM_DIGITS`] digits are rejected
/// regardless of their checksum.
///
/// # Example
///
/// ```
/// use cardprobe::luhn::is_checksum_valid;
///
/// let digits = [4, 5, 3, 9, 1, 4, 8, 8, 0, 3, 4, 3, 6, 4, 6, 7];
/// assert!(is_checksum_valid(&digits));
///
/// // Passes mod 10, but too short to be a card number
/// assert!(!is_checksum_valid(&[0, 0, 0, 0]));
/// ```
#[inline]
pub fn is_checksum_valid(digits: &[u8]) -> bool {
    if digits.len() < MIN_CHECKSUM_DIGITS {
        return false;
    }
    checksum_matches(digits)
}

/// The bare mod-10 test, without the minimum length floor.
#[inline]
pub fn checksum_matches(digits: &[u8]) -> bool {
    compute_checksum(digits, false) % 10 == 0
}

/// Computes the Luhn sum for a sequence of digits.
///
/// Traverses right to left. `double_first` selects whether the rightmost
/// digit is doubled: false when validating a complete number, true when the
/// check digit is still missing.
///
/// # Panics
///
/// Every element must be a digit value in `0..=9`. Larger values panic on
/// the table lookup. Use [`to_digits`] to convert text.
#[inline]
pub fn compute_checksum(digits: &[u8], double_first: bool) -> u32 {
    let mut double = double_first;
    let mut sum: u32 = 0;

    for &digit in digits.iter().rev() {
        debug_assert!(digit <= 9, "not a digit value: {digit}");
        sum += if double {
            DOUBLE_TABLE[digit as usize] as u32
        } else {
            digit as u32
        };
        double = !double;
    }

    sum
}

/// Computes the check digit that makes `partial` Luhn-valid once appended.
///
/// # Example
///
/// ```
/// use cardprobe::luhn::compute_check_digit;
///
/// let partial = [4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1];
/// assert_eq!(compute_check_digit(&partial), 1);
/// ```
#[inline]
pub fn compute_check_digit(partial: &[u8]) -> u8 {
    let sum = compute_checksum(partial, true);
    ((10 - (sum % 10)) % 10) as u8
}

/// Checks a raw card number string, ignoring separators.
pub fn passes_luhn(input: &str) -> bool {
    is_checksum_valid(&to_digits(input))
}

/// Computes the check digit for a raw partial number string.
pub fn check_digit_for(partial: &str) -> u8 {
    compute_check_digit(&to_digits(partial))
}
