//! Card validation orchestration.
//!
//! Combines the checksum engine, issuer classification, BIN resolution and
//! the expiry/CVV checks into one [`ValidationVerdict`].
//!
//! Validation is total: malformed input produces a verdict with errors, never
//! an `Err` or a panic. Every field is checked independently, so a verdict can
//! carry a number error, an expiry error and a CVV error at once.

use std::collections::BTreeMap;
use zeroize::Zeroizing;

use crate::bindb::BinRegistry;
use crate::card::{Issuer, MAX_CARD_DIGITS, MIN_CARD_DIGITS};
use crate::cvv::validate_cvv;
use crate::detect::classify;
use crate::error::{Field, ValidationError};
use crate::expiry::{check_expiry, YearMonth};
use crate::format::to_digits;
use crate::luhn::is_checksum_valid;

/// Per-field validation errors, at most one per field.
pub type FieldErrors = BTreeMap<Field, ValidationError>;

/// Outcome of validating one card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationVerdict {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Network of the number, `Unknown` if no rule matched.
    pub issuer: Issuer,
    /// Luhn result, independent of the length check (13-digit floor only).
    pub luhn_valid: bool,
    /// Country from BIN resolution, or `"Unknown"`.
    pub country: String,
    /// Bank from BIN resolution.
    pub bank: Option<String>,
    /// Card tier from BIN resolution.
    pub tier: Option<String>,
    /// Failing fields and their reasons.
    pub errors: FieldErrors,
}

impl ValidationVerdict {
    /// Returns the error recorded for `field`, if any.
    pub fn error(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    /// Verdict for a record that could not be split into card fields.
    pub(crate) fn incomplete_row(fields: usize) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Number, ValidationError::IncompleteRow { fields });
        Self {
            is_valid: false,
            issuer: Issuer::Unknown,
            luhn_valid: false,
            country: crate::bindb::UNKNOWN_COUNTRY.to_string(),
            bank: None,
            tier: None,
            errors,
        }
    }
}

/// Validates cards against a BIN registry.
///
/// # Example
///
/// ```
/// use cardprobe::bindb::BinRegistry;
/// use cardprobe::expiry::YearMonth;
/// use cardprobe::validate::CardValidator;
/// use cardprobe::{Field, Issuer};
///
/// let validator = CardValidator::new(BinRegistry::builtin());
/// let verdict = validator.validate_at("4111 1111 1111 1111", "01/20", "123", YearMonth::new(26, 10));
///
/// assert!(!verdict.is_valid);
/// assert!(verdict.luhn_valid);
/// assert_eq!(verdict.issuer, Issuer::Visa);
/// assert_eq!(verdict.error(Field::Expiry).unwrap().to_string(), "Card is expired");
/// assert_eq!(verdict.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CardValidator<'a> {
    registry: &'a BinRegistry,
}

impl<'a> CardValidator<'a> {
    /// Creates a validator resolving BINs against `registry`.
    pub fn new(registry: &'a BinRegistry) -> Self {
        Self { registry }
    }

    /// The registry used for BIN resolution.
    pub fn registry(&self) -> &'a BinRegistry {
        self.registry
    }

    /// Validates against the current local month.
    ///
    /// Empty `expiry` or `cvv` means "not provided" and is not checked.
    pub fn validate(&self, number: &str, expiry: &str, cvv: &str) -> ValidationVerdict {
        self.validate_at(number, expiry, cvv, YearMonth::current())
    }

    /// Validates with an explicit reference month.
    pub fn validate_at(
        &self,
        number: &str,
        expiry: &str,
        cvv: &str,
        today: YearMonth,
    ) -> ValidationVerdict {
        let digits = Zeroizing::new(to_digits(number));
        let mut errors = FieldErrors::new();

        let luhn_valid = is_checksum_valid(&digits);
        if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
            errors.insert(
                Field::Number,
                ValidationError::InvalidLength {
                    length: digits.len(),
                },
            );
        } else if !luhn_valid {
            errors.insert(Field::Number, ValidationError::FailedChecksum);
        }

        if !expiry.is_empty() {
            if let Err(err) = check_expiry(expiry, today) {
                errors.insert(Field::Expiry, err);
            }
        }

        if !cvv.is_empty() {
            if let Err(err) = validate_cvv(cvv) {
                errors.insert(Field::Cvv, err);
            }
        }

        let labels = self.registry.resolve(&digits);

        ValidationVerdict {
            is_valid: errors.is_empty(),
            issuer: classify(&digits),
            luhn_valid,
            country: labels.country,
            bank: labels.bank,
            tier: labels.tier,
            errors,
        }
    }
}

impl Default for CardValidator<'static> {
    fn default() -> Self {
        Self::new(BinRegistry::builtin())
    }
}

/// Validates a card against the built-in registry and the current month.
///
/// # Example
///
/// ```
/// use cardprobe::validate_card;
///
/// let verdict = validate_card("4539 1488 0343 6467", "", "");
/// assert!(verdict.is_valid);
/// ```
pub fn validate_card(number: &str, expiry: &str, cvv: &str) -> ValidationVerdict {
    CardValidator::default().validate(number, expiry, cvv)
}
