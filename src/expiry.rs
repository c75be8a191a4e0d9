//! Card expiry parsing and checking.
//!
//! Only the `MM/YY` form is accepted. Comparison is done on two-digit years
//! against the current local month, so a card stays valid through the last
//! day of its expiry month.
//!
//! # Example
//!
//! ```
//! use cardprobe::expiry::{check_expiry, YearMonth};
//!
//! let today = YearMonth::new(26, 10);
//! assert!(check_expiry("10/26", today).is_ok());
//! assert!(check_expiry("09/26", today).is_err());
//! assert!(check_expiry("1/26", today).is_err());
//! ```

use chrono::{Datelike, Local};
use std::fmt;

use crate::error::ValidationError;

/// A month reference point with a two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    // Field order gives the derived Ord year-major comparison.
    year: u8,
    month: u8,
}

impl YearMonth {
    /// Creates a reference month from a two-digit year and a month.
    pub const fn new(year: u8, month: u8) -> Self {
        Self { year, month }
    }

    /// The current month in local time.
    pub fn current() -> Self {
        let now = Local::now();
        Self {
            year: now.year().rem_euclid(100) as u8,
            month: now.month() as u8,
        }
    }

    /// Two-digit year.
    #[inline]
    pub const fn year(&self) -> u8 {
        self.year
    }

    /// Month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }
}

/// A parsed `MM/YY` expiry with an in-range month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryDate {
    month: u8,
    year: u8,
}

impl ExpiryDate {
    /// Month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Two-digit year.
    #[inline]
    pub const fn year(&self) -> u8 {
        self.year
    }

    /// Returns true if the expiry month lies strictly before `today`.
    pub fn is_expired_at(&self, today: YearMonth) -> bool {
        self.year < today.year || (self.year == today.year && self.month < today.month)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

/// Parses an `MM/YY` string without checking whether it has passed.
///
/// The input must be exactly two ASCII digits, a slash, and two ASCII digits.
pub fn parse_expiry(input: &str) -> Result<ExpiryDate, ValidationError> {
    let (month, year) = match input.as_bytes() {
        [m1, m2, b'/', y1, y2] if [m1, m2, y1, y2].iter().all(|b| b.is_ascii_digit()) => {
            ((m1 - b'0') * 10 + (m2 - b'0'), (y1 - b'0') * 10 + (y2 - b'0'))
        }
        _ => return Err(ValidationError::ExpiryFormat),
    };

    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month));
    }

    Ok(ExpiryDate { month, year })
}

/// Parses an `MM/YY` string and rejects months before `today`.
pub fn check_expiry(input: &str, today: YearMonth) -> Result<ExpiryDate, ValidationError> {
    let expiry = parse_expiry(input)?;
    if expiry.is_expired_at(today) {
        return Err(ValidationError::Expired {
            month: expiry.month,
            year: expiry.year,
        });
    }
    Ok(expiry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: YearMonth = YearMonth::new(26, 10);

    #[test]
    fn test_parse_valid() {
        let exp = parse_expiry("12/30").unwrap();
        assert_eq!(exp.month(), 12);
        assert_eq!(exp.year(), 30);
        assert_eq!(exp.to_string(), "12/30");
    }

    #[test]
    fn test_format_rejections() {
        for input in ["", "1/26", "01-26", "01/2026", "0126", "ab/cd", " 01/26", "01/26 "] {
            assert_eq!(
                parse_expiry(input),
                Err(ValidationError::ExpiryFormat),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert_eq!(parse_expiry("٠١/٢٦"), Err(ValidationError::ExpiryFormat));
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(parse_expiry("00/30"), Err(ValidationError::InvalidMonth(0)));
        assert_eq!(parse_expiry("13/30"), Err(ValidationError::InvalidMonth(13)));
    }

    #[test]
    fn test_expired() {
        assert!(matches!(
            check_expiry("01/20", TODAY),
            Err(ValidationError::Expired { month: 1, year: 20 })
        ));
        assert!(check_expiry("09/26", TODAY).is_err());
    }

    #[test]
    fn test_current_month_is_still_valid() {
        assert!(check_expiry("10/26", TODAY).is_ok());
        assert!(check_expiry("11/26", TODAY).is_ok());
        assert!(check_expiry("01/27", TODAY).is_ok());
    }

    #[test]
    fn test_month_checked_before_expiry() {
        // 13/10 is both out of range and in the past
        assert_eq!(check_expiry("13/10", TODAY), Err(ValidationError::InvalidMonth(13)));
    }

    #[test]
    fn test_current_is_in_range() {
        let now = YearMonth::current();
        assert!((1..=12).contains(&now.month()));
        assert!(now.year() < 100);
    }

    #[test]
    fn test_year_month_ordering() {
        assert!(YearMonth::new(26, 12) < YearMonth::new(27, 1));
        assert!(YearMonth::new(26, 2) > YearMonth::new(26, 1));
    }
}
