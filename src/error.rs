//! Field-level validation errors.
//!
//! Invalid input never aborts validation. Each failing field records one of
//! these values in the verdict, and the `Display` text is the reason shown to
//! the user.

use std::fmt;

/// The input field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Field {
    /// The card number.
    Number,
    /// The `MM/YY` expiry date.
    Expiry,
    /// The card verification value.
    Cvv,
}

impl Field {
    /// Returns the lowercase field name (`"number"`, `"expiry"`, `"cvv"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a card field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The number has fewer than 13 or more than 19 digits.
    #[error("Invalid card number length")]
    InvalidLength {
        /// Digits found after stripping separators.
        length: usize,
    },

    /// The number has a valid length but fails the Luhn check.
    #[error("Failed Luhn validation check")]
    FailedChecksum,

    /// The expiry is not two digits, a slash, and two digits.
    #[error("Format MM/YY required")]
    ExpiryFormat,

    /// The expiry month is outside 1-12.
    #[error("Invalid month")]
    InvalidMonth(u8),

    /// The expiry month is before the current month.
    #[error("Card is expired")]
    Expired {
        /// Expiry month (1-12).
        month: u8,
        /// Two-digit expiry year.
        year: u8,
    },

    /// The CVV is not 3-4 ASCII digits.
    #[error("Invalid CVV")]
    InvalidCvv,

    /// A bulk input line had fewer fields than a card record needs.
    #[error("Incomplete data row")]
    IncompleteRow {
        /// Number of fields found on the line.
        fields: usize,
    },
}

impl ValidationError {
    /// Returns the field this error is reported under.
    pub const fn field(&self) -> Field {
        match self {
            Self::InvalidLength { .. } | Self::FailedChecksum | Self::IncompleteRow { .. } => {
                Field::Number
            }
            Self::ExpiryFormat | Self::InvalidMonth(_) | Self::Expired { .. } => Field::Expiry,
            Self::InvalidCvv => Field::Cvv,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
