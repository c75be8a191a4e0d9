//! # cardprobe
//!
//! Payment card identification, validation and synthetic test-card
//! generation.
//!
//! ## Features
//!
//! - Luhn checksum validation and check-digit computation
//! - Issuer network detection (10 networks, fixed rule priority)
//! - BIN resolution to country, bank and card tier (longest prefix wins)
//! - Expiry (`MM/YY`) and CVV checks with per-field error reporting
//! - Checksum-valid test card generation by prefix, issuer or country
//! - Bulk parsing of CSV-like card records
//! - CLI and REST API front ends
//!
//! ## Quick Start
//!
//! ```rust
//! use cardprobe::{validate_card, Field, Issuer};
//!
//! let verdict = validate_card("4539 1488 0343 6467", "12/99", "123");
//! assert!(verdict.is_valid);
//! assert_eq!(verdict.issuer, Issuer::Visa);
//!
//! // Every failing field is reported, validation never stops early
//! let verdict = validate_card("4111 1111 1111 1112", "13/30", "12");
//! assert_eq!(verdict.errors.len(), 3);
//! assert_eq!(
//!     verdict.errors[&Field::Number].to_string(),
//!     "Failed Luhn validation check"
//! );
//! ```
//!
//! ## BIN Resolution
//!
//! ```rust
//! use cardprobe::BinRegistry;
//!
//! let found = BinRegistry::builtin().resolve_str("4056 6300 0000 0000");
//! assert_eq!(found.country, "Sri Lanka");
//! assert_eq!(found.tier.as_deref(), Some("Visa Gold"));
//! ```
//!
//! ## Test Card Generation
//!
//! ```rust
//! use cardprobe::generate::{random_card, GenerateOptions};
//! use cardprobe::{luhn, BinRegistry, Issuer};
//!
//! let card = random_card(BinRegistry::builtin(), &GenerateOptions::issuer(Issuer::Amex));
//! assert_eq!(card.issuer(), Issuer::Amex);
//! assert_eq!(card.cvv().len(), 4);
//! assert!(luhn::passes_luhn(card.number()));
//! ```
//!
//! ## Supported Networks
//!
//! Rules are tried in this order; the first match wins.
//!
//! | Network | Prefix |
//! |---------|--------|
//! | Visa | 4 |
//! | Mastercard | 51-55, 2221-2720 |
//! | American Express | 34, 37 |
//! | Discover | 6011, 65, 644-649, 622 |
//! | JCB | 2131, 1800, 35 |
//! | Diners Club | 300-305, 36, 38 |
//! | Maestro | 5018, 5020, 5038, 6304, 6759, 6761, 6763 |
//! | UnionPay | 62 |
//! | Mir | 2200-2204 |
//! | RuPay | 60, 65, 81, 82, 508 |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialize verdicts, rows and generated cards |
//! | `bin-json` | JSON BIN registry loader |
//! | `bin-csv` | CSV BIN registry loader |
//! | `advisory` | Advisory-service request/reply contract |
//! | `cli` | Command-line tool |
//! | `server` | REST API with Swagger UI |
//!
//! ## Security
//!
//! - Generated numbers are synthetic test data from a non-cryptographic PRNG
//! - Digit buffers used during validation are zeroized on drop
//! - Validated CVVs print masked in `Debug` and `Display`
//! - The BIN table is illustrative, not an issuer authority
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

#[cfg(feature = "advisory")]
pub mod advisory;
pub mod bindb;
pub mod bulk;
pub mod card;
pub mod cvv;
pub mod detect;
pub mod error;
pub mod expiry;
pub mod format;
pub mod generate;
pub mod luhn;
pub mod validate;

// Re-export main types at crate root
pub use bindb::{BinMatch, BinRegistry};
pub use bulk::{parse_bulk, BulkRow, BulkSummary};
pub use card::{Issuer, MAX_CARD_DIGITS, MIN_CARD_DIGITS};
pub use detect::classify;
pub use error::{Field, ValidationError};
pub use generate::{GenerateOptions, GeneratedCard};
pub use luhn::passes_luhn;
pub use validate::{validate_card, CardValidator, ValidationVerdict};
