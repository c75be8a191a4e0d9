//! BIN (Bank Identification Number) registry.
//!
//! Maps leading card digits to the issuing country, bank and card tier.
//! Entries are authored per country and flattened into a single index sorted
//! by descending prefix length, so a lookup always returns the most specific
//! (longest) matching prefix. A 6-digit bank-level entry therefore wins over
//! a 4-digit fallback for the same bank.
//!
//! The table is illustrative and regionally biased. It is not an authority
//! on real issuers.
//!
//! # Features
//!
//! - `bin-json` - JSON file loader
//! - `bin-csv` - CSV file loader
//!
//! # Example
//!
//! ```
//! use cardprobe::bindb::BinRegistry;
//! use cardprobe::format::to_digits;
//!
//! let registry = BinRegistry::builtin();
//! let found = registry.resolve(&to_digits("4056630000000000"));
//! assert_eq!(found.country, "Sri Lanka");
//! assert_eq!(found.bank.as_deref(), Some("Commercial Bank"));
//! assert_eq!(found.tier.as_deref(), Some("Visa Gold"));
//! ```

mod builtin;
mod registry;

#[cfg(feature = "bin-json")]
mod json;

#[cfg(feature = "bin-csv")]
mod csv;

pub use registry::{BinRegistry, BinRegistryBuilder};

#[cfg(feature = "bin-json")]
pub use json::JsonBinLoader;

#[cfg(feature = "bin-csv")]
pub use csv::CsvBinLoader;

/// Country reported when no entry matches.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One prefix entry of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinEntry {
    /// Leading digits this entry applies to.
    pub prefix: String,
    /// Country name of the issuer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub country: String,
    /// ISO-like country code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: String,
    /// Issuing bank.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bank: Option<String>,
    /// Card tier or product (e.g. "Visa Gold").
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: Option<String>,
}

impl BinEntry {
    /// Creates an entry for `prefix`. Non-digit characters are dropped.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: crate::format::strip_formatting(prefix),
            ..Default::default()
        }
    }

    /// Builder method to set the bank.
    pub fn bank(mut self, bank: impl Into<String>) -> Self {
        self.bank = Some(bank.into());
        self
    }

    /// Builder method to set the tier.
    pub fn tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Returns true if `digits` starts with this entry's prefix.
    ///
    /// An empty prefix never matches.
    #[inline]
    pub fn matches(&self, digits: &[u8]) -> bool {
        let prefix = self.prefix.as_bytes();
        !prefix.is_empty()
            && digits.len() >= prefix.len()
            && prefix.iter().zip(digits).all(|(&p, &d)| p.wrapping_sub(b'0') == d)
    }
}

/// The entries of one country, in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CountryTable {
    /// Country name.
    pub country: String,
    /// ISO-like country code.
    pub code: String,
    /// Entries, each carrying this table's country and code.
    pub bins: Vec<BinEntry>,
}

impl CountryTable {
    /// Creates an empty table.
    pub fn new(country: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            code: code.into(),
            bins: Vec::new(),
        }
    }

    /// Builder method to add an entry.
    pub fn bin(mut self, entry: BinEntry) -> Self {
        self.push(entry);
        self
    }

    /// Adds an entry, labelling it with this table's country.
    ///
    /// Entries whose prefix has no digits are skipped.
    pub fn push(&mut self, mut entry: BinEntry) {
        entry.prefix = crate::format::strip_formatting(&entry.prefix);
        if entry.prefix.is_empty() {
            tracing::warn!(country = %self.code, "skipping BIN entry without digits");
            return;
        }
        entry.country = self.country.clone();
        entry.code = self.code.clone();
        self.bins.push(entry);
    }

    /// Returns true if `code` names this table (ASCII case-insensitive).
    #[inline]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

/// Result of resolving a card number against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BinMatch {
    /// Country name, or `"Unknown"`.
    pub country: String,
    /// Country code of the matched entry.
    pub code: Option<String>,
    /// Issuing bank of the matched entry.
    pub bank: Option<String>,
    /// Card tier of the matched entry.
    pub tier: Option<String>,
}

impl BinMatch {
    /// The no-match result.
    pub fn unknown() -> Self {
        Self {
            country: UNKNOWN_COUNTRY.to_string(),
            code: None,
            bank: None,
            tier: None,
        }
    }

    /// Returns true if an entry matched.
    pub fn is_known(&self) -> bool {
        self.code.is_some()
    }
}

impl Default for BinMatch {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<&BinEntry> for BinMatch {
    fn from(entry: &BinEntry) -> Self {
        Self {
            country: entry.country.clone(),
            code: Some(entry.code.clone()),
            bank: entry.bank.clone(),
            tier: entry.tier.clone(),
        }
    }
}

/// Error type for loading a registry from external data.
#[derive(Debug, thiserror::Error)]
pub enum BinDbError {
    /// Failed to read the source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The source is not in the expected format.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The source contained no usable entries.
    #[error("Invalid database: no BIN entries found")]
    Empty,
}
