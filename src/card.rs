//! Core card types: the issuer network and card-number length bounds.

use std::fmt;
use std::str::FromStr;

/// Maximum number of digits in a card number.
pub const MAX_CARD_DIGITS: usize = 19;

/// Minimum number of digits in a card number.
pub const MIN_CARD_DIGITS: usize = 13;

/// Issuing network of a card, as identified from its leading digits.
///
/// The set is closed. [`Issuer::Unknown`] is a normal classification result,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Issuer {
    /// Visa - prefix 4
    Visa,
    /// Mastercard - prefix 51-55, 2221-2720
    Mastercard,
    /// American Express - prefix 34, 37
    Amex,
    /// Discover - prefix 6011, 622, 644-649, 65
    Discover,
    /// JCB - prefix 35, 2131, 1800
    Jcb,
    /// Diners Club - prefix 300-305, 36, 38
    Diners,
    /// Maestro - selected 50xx and 6xxx prefixes
    Maestro,
    /// UnionPay - prefix 62
    UnionPay,
    /// Mir - Russian payment system, prefix 2200-2204
    Mir,
    /// RuPay - Indian payment system, prefix 60, 65, 81, 82, 508
    RuPay,
    /// No rule matched.
    #[default]
    Unknown,
}

impl Issuer {
    /// Every issuer, in declaration order.
    pub const ALL: [Issuer; 11] = [
        Self::Visa,
        Self::Mastercard,
        Self::Amex,
        Self::Discover,
        Self::Jcb,
        Self::Diners,
        Self::Maestro,
        Self::UnionPay,
        Self::Mir,
        Self::RuPay,
        Self::Unknown,
    ];

    /// Returns the lowercase identifier used on the wire (`"visa"`, `"amex"`).
    #[inline]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Jcb => "jcb",
            Self::Diners => "diners",
            Self::Maestro => "maestro",
            Self::UnionPay => "unionpay",
            Self::Mir => "mir",
            Self::RuPay => "rupay",
            Self::Unknown => "unknown",
        }
    }

    /// Returns a human-readable name for the network.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "American Express",
            Self::Discover => "Discover",
            Self::Jcb => "JCB",
            Self::Diners => "Diners Club",
            Self::Maestro => "Maestro",
            Self::UnionPay => "UnionPay",
            Self::Mir => "Mir",
            Self::RuPay => "RuPay",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns true for [`Issuer::Unknown`].
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Number of CVV digits printed on this network's cards.
    #[inline]
    pub const fn cvv_length(&self) -> usize {
        match self {
            Self::Amex => 4,
            _ => 3,
        }
    }

    /// Number length used when synthesizing cards for this network.
    #[inline]
    pub const fn generated_length(&self) -> usize {
        match self {
            Self::Amex => 15,
            _ => 16,
        }
    }
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unrecognised issuer name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown issuer: {0}")]
pub struct ParseIssuerError(pub String);

impl FromStr for Issuer {
    type Err = ParseIssuerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visa" => Ok(Self::Visa),
            "mastercard" | "mc" => Ok(Self::Mastercard),
            "amex" | "american express" => Ok(Self::Amex),
            "discover" => Ok(Self::Discover),
            "jcb" => Ok(Self::Jcb),
            "diners" | "dinersclub" | "diners club" => Ok(Self::Diners),
            "maestro" => Ok(Self::Maestro),
            "unionpay" | "union pay" => Ok(Self::UnionPay),
            "mir" => Ok(Self::Mir),
            "rupay" => Ok(Self::RuPay),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseIssuerError(s.to_string())),
        }
    }
}
