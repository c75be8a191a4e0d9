//! CVV/CVC/CID checking.
//!
//! Any 3- or 4-digit code is accepted regardless of network. The generator
//! uses [`Issuer::cvv_length`](crate::Issuer::cvv_length) to pick the
//! network-specific length.
//!
//! # Example
//!
//! ```
//! use cardprobe::cvv::validate_cvv;
//!
//! assert!(validate_cvv("123").is_ok());
//! assert!(validate_cvv("1234").is_ok());
//! assert!(validate_cvv("12").is_err());
//! assert!(validate_cvv("12a").is_err());
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ValidationError;

/// Shortest accepted CVV.
pub const MIN_CVV_DIGITS: usize = 3;

/// Longest accepted CVV.
pub const MAX_CVV_DIGITS: usize = 4;

/// A checked CVV. The digits are wiped when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ValidatedCvv {
    digits: [u8; MAX_CVV_DIGITS],
    length: u8,
}

impl ValidatedCvv {
    /// Returns the number of digits.
    #[inline]
    pub const fn length(&self) -> usize {
        self.length as usize
    }

    /// Returns true for a 4-digit (Amex style) code.
    #[inline]
    pub const fn is_four_digit(&self) -> bool {
        self.length == 4
    }

    /// Returns the CVV digits as a slice.
    pub fn digits(&self) -> &[u8] {
        &self.digits[..self.length as usize]
    }
}

impl fmt::Debug for ValidatedCvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCvv")
            .field("value", &"***")
            .field("length", &self.length)
            .finish()
    }
}

impl fmt::Display for ValidatedCvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "*".repeat(self.length as usize))
    }
}

/// Checks that `input` is 3-4 ASCII digits.
///
/// No trimming is done; surrounding whitespace makes the code invalid.
pub fn validate_cvv(input: &str) -> Result<ValidatedCvv, ValidationError> {
    let bytes = input.as_bytes();
    if !(MIN_CVV_DIGITS..=MAX_CVV_DIGITS).contains(&bytes.len())
        || !bytes.iter().all(u8::is_ascii_digit)
    {
        return Err(ValidationError::InvalidCvv);
    }

    let mut digits = [0u8; MAX_CVV_DIGITS];
    for (slot, b) in digits.iter_mut().zip(bytes) {
        *slot = b - b'0';
    }

    Ok(ValidatedCvv {
        digits,
        length: bytes.len() as u8,
    })
}
