//! Synthetic card generation for testing purposes.
//!
//! Numbers produced here pass the Luhn check but are not connected to real
//! accounts. The generator uses a plain uniform PRNG and gives no
//! cryptographic guarantee; every `*_with_rng` variant accepts a caller RNG so
//! tests can seed it.
//!
//! # Example
//!
//! ```
//! use cardprobe::generate::from_prefix;
//! use cardprobe::luhn::passes_luhn;
//!
//! let number = from_prefix("405663", 16);
//! assert_eq!(number.len(), 16);
//! assert!(number.starts_with("405663"));
//! assert!(passes_luhn(&number));
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::bindb::BinRegistry;
use crate::card::Issuer;
use crate::detect::classify;
use crate::expiry::YearMonth;
use crate::format::{digits_to_string, format_card_number, to_digits};
use crate::luhn::compute_check_digit;
use crate::validate::CardValidator;

/// Target length used when none is given.
pub const DEFAULT_LENGTH: usize = 16;

/// Upper bound on cards produced by one batch call.
pub const MAX_BATCH: usize = 1000;

/// Placeholder holder names. Output is upper-cased.
pub const HOLDER_NAMES: [&str; 8] = [
    "James Smith",
    "Maria Garcia",
    "Robert Johnson",
    "Patricia Williams",
    "Michael Brown",
    "Linda Jones",
    "David Miller",
    "Elizabeth Davis",
];

/// Prefix used for an issuer with no entry in [`ISSUER_PREFIXES`].
pub const FALLBACK_PREFIX: &str = "4";

/// Candidate prefixes per issuer for random generation.
pub static ISSUER_PREFIXES: [(Issuer, &[&str]); 7] = [
    (Issuer::Visa, &["4539", "4556", "4916", "4532", "4929"]),
    (Issuer::Mastercard, &["51", "52", "53", "54", "55"]),
    (Issuer::Amex, &["34", "37"]),
    (Issuer::Discover, &["6011", "65"]),
    (Issuer::Jcb, &["3528", "3589"]),
    (Issuer::Diners, &["300", "301", "36"]),
    (Issuer::RuPay, &["60", "65"]),
];

/// Returns the candidate prefixes for `issuer`, if it has any.
pub fn prefixes_for(issuer: Issuer) -> Option<&'static [&'static str]> {
    ISSUER_PREFIXES
        .iter()
        .find(|(candidate, _)| *candidate == issuer)
        .map(|&(_, prefixes)| prefixes)
}

/// Completes `prefix` into a Luhn-valid number of `target_len` digits.
///
/// Non-digits in `prefix` are dropped. A prefix that already has at least
/// `target_len - 1` digits is kept whole and only the check digit is appended,
/// so the result can be longer than `target_len`.
pub fn from_prefix(prefix: &str, target_len: usize) -> String {
    from_prefix_with_rng(prefix, target_len, &mut rand::thread_rng())
}

/// Like [`from_prefix`] with a caller-supplied RNG.
pub fn from_prefix_with_rng<R: Rng + ?Sized>(prefix: &str, target_len: usize, rng: &mut R) -> String {
    let mut digits = to_digits(prefix);
    let body_len = target_len.saturating_sub(1);

    while digits.len() < body_len {
        digits.push(rng.gen_range(0..10));
    }

    let check = compute_check_digit(&digits);
    digits.push(check);
    digits_to_string(&digits)
}

/// Constraints for [`random_card`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct GenerateOptions {
    /// Issuer whose prefixes to draw from. `None` or `Unknown` picks one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub issuer: Option<Issuer>,
    /// Country whose BIN entries to draw from. Takes precedence over `issuer`
    /// when the code is known to the registry.
    #[cfg_attr(feature = "serde", serde(default, alias = "countryCode"))]
    pub country_code: Option<String>,
}

impl GenerateOptions {
    /// Options restricted to one issuer.
    pub fn issuer(issuer: Issuer) -> Self {
        Self {
            issuer: Some(issuer),
            ..Self::default()
        }
    }

    /// Options restricted to one country.
    pub fn country(code: impl Into<String>) -> Self {
        Self {
            country_code: Some(code.into()),
            ..Self::default()
        }
    }
}

/// A synthetic card. Fields are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeneratedCard {
    number: String,
    expiry: String,
    cvv: String,
    holder: String,
    country: String,
    bank: Option<String>,
    tier: Option<String>,
}

impl GeneratedCard {
    /// Card number grouped in blocks of four.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Expiry as `MM/YY`.
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Card verification value.
    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    /// Upper-case holder name.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Country resolved from the number, or `"Unknown"`.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Bank resolved from the number.
    pub fn bank(&self) -> Option<&str> {
        self.bank.as_deref()
    }

    /// Tier resolved from the number.
    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    /// Network of the number.
    pub fn issuer(&self) -> Issuer {
        classify(&to_digits(&self.number))
    }

    /// Renders the card as a bulk input line:
    /// `issuer,HOLDER,"number",cvv,MM/YY`.
    pub fn to_bulk_line(&self, issuer: Issuer) -> String {
        format!(
            "{},{},\"{}\",{},{}",
            issuer.id(),
            self.holder,
            self.number,
            self.cvv,
            self.expiry
        )
    }
}

impl fmt::Display for GeneratedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  {}  {}", self.number, self.expiry, self.cvv, self.holder)
    }
}

/// Generates one random card.
///
/// # Example
///
/// ```
/// use cardprobe::bindb::BinRegistry;
/// use cardprobe::generate::{random_card, GenerateOptions};
///
/// let card = random_card(BinRegistry::builtin(), &GenerateOptions::country("LK"));
/// assert_eq!(card.country(), "Sri Lanka");
/// ```
pub fn random_card(registry: &BinRegistry, options: &GenerateOptions) -> GeneratedCard {
    random_card_with_rng(registry, options, &mut rand::thread_rng(), YearMonth::current())
}

/// Like [`random_card`] with a caller-supplied RNG and clock.
pub fn random_card_with_rng<R: Rng + ?Sized>(
    registry: &BinRegistry,
    options: &GenerateOptions,
    rng: &mut R,
    today: YearMonth,
) -> GeneratedCard {
    let prefix = pick_prefix(registry, options, rng);
    let length = classify(&to_digits(prefix)).generated_length();

    let digits = to_digits(&from_prefix_with_rng(prefix, length, rng));
    let cvv_len = classify(&digits).cvv_length();
    let labels = registry.resolve(&digits);

    GeneratedCard {
        number: format_card_number(&digits_to_string(&digits)),
        expiry: random_expiry(rng, today),
        cvv: random_cvv(rng, cvv_len),
        holder: random_holder(rng),
        country: labels.country,
        bank: labels.bank,
        tier: labels.tier,
    }
}

/// Generates `count` random cards, clamped to `1..=MAX_BATCH`.
pub fn generate_batch(
    registry: &BinRegistry,
    options: &GenerateOptions,
    count: usize,
) -> Vec<GeneratedCard> {
    generate_batch_with_rng(registry, options, count, &mut rand::thread_rng(), YearMonth::current())
}

/// Like [`generate_batch`] with a caller-supplied RNG and clock.
pub fn generate_batch_with_rng<R: Rng + ?Sized>(
    registry: &BinRegistry,
    options: &GenerateOptions,
    count: usize,
    rng: &mut R,
    today: YearMonth,
) -> Vec<GeneratedCard> {
    let count = clamp_count(count);
    let cards: Vec<_> = (0..count)
        .map(|_| random_card_with_rng(registry, options, rng, today))
        .collect();
    tracing::debug!(count, "generated random cards");
    cards
}

/// Generates `count` cards from a fixed BIN, clamped to `1..=MAX_BATCH`.
///
/// Numbers are 16 digits starting with `bin`. The expiry is
/// `expiry_override` when given, else a random future month. Labels come
/// from validating the generated number against `registry`.
pub fn generate_from_bin(
    registry: &BinRegistry,
    bin: &str,
    count: usize,
    expiry_override: Option<&str>,
) -> Vec<GeneratedCard> {
    generate_from_bin_with_rng(
        registry,
        bin,
        count,
        expiry_override,
        &mut rand::thread_rng(),
        YearMonth::current(),
    )
}

/// Like [`generate_from_bin`] with a caller-supplied RNG and clock.
pub fn generate_from_bin_with_rng<R: Rng + ?Sized>(
    registry: &BinRegistry,
    bin: &str,
    count: usize,
    expiry_override: Option<&str>,
    rng: &mut R,
    today: YearMonth,
) -> Vec<GeneratedCard> {
    let validator = CardValidator::new(registry);
    let expiry_override = expiry_override.filter(|e| !e.is_empty());
    let count = clamp_count(count);

    let cards: Vec<_> = (0..count)
        .map(|_| {
            let number = from_prefix_with_rng(bin, DEFAULT_LENGTH, rng);
            let expiry = match expiry_override {
                Some(expiry) => expiry.to_string(),
                None => random_expiry(rng, today),
            };
            let cvv = rng.gen_range(100..=998u16).to_string();
            let verdict = validator.validate_at(&number, &expiry, &cvv, today);

            GeneratedCard {
                number: format_card_number(&number),
                expiry,
                cvv,
                holder: random_holder(rng),
                country: verdict.country,
                bank: verdict.bank,
                tier: verdict.tier,
            }
        })
        .collect();

    tracing::debug!(count, "generated cards from BIN");
    cards
}

fn clamp_count(count: usize) -> usize {
    count.clamp(1, MAX_BATCH)
}

fn pick_prefix<'r, R: Rng + ?Sized>(
    registry: &'r BinRegistry,
    options: &GenerateOptions,
    rng: &mut R,
) -> &'r str {
    if let Some(code) = options.country_code.as_deref() {
        if let Some(entry) = registry.entries_for(code).choose(rng) {
            tracing::trace!(country = code, "prefix from country table");
            return &entry.prefix;
        }
    }

    let issuer = match options.issuer {
        Some(issuer) if !issuer.is_unknown() => issuer,
        _ => {
            let index = rng.gen_range(0..ISSUER_PREFIXES.len());
            ISSUER_PREFIXES[index].0
        }
    };

    tracing::trace!(issuer = issuer.id(), "prefix from issuer table");
    prefixes_for(issuer)
        .and_then(|prefixes| prefixes.choose(rng).copied())
        .unwrap_or(FALLBACK_PREFIX)
}

// Two-digit years do not wrap: near the end of a century the year is capped
// at 99, and a capped year equal to today's draws no month before today's.
fn random_expiry<R: Rng + ?Sized>(rng: &mut R, today: YearMonth) -> String {
    let year = (today.year() + rng.gen_range(1..=5u8)).min(99);
    let month: u8 = if year == today.year() {
        rng.gen_range(today.month()..=12)
    } else {
        rng.gen_range(1..=12)
    };
    format!("{:02}/{:02}", month, year)
}

fn random_cvv<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let low = 10u32.pow(length as u32 - 1);
    let high = 10u32.pow(length as u32) - 1;
    rng.gen_range(low..=high).to_string()
}

fn random_holder<R: Rng + ?Sized>(rng: &mut R) -> String {
    HOLDER_NAMES
        .choose(rng)
        .copied()
        .unwrap_or(HOLDER_NAMES[0])
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::check_expiry;
    use crate::luhn::{is_checksum_valid, passes_luhn};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TODAY: YearMonth = YearMonth::new(26, 10);

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_from_prefix() {
        let number = from_prefix("405663", 16);
        assert_eq!(number.len(), 16);
        assert!(number.starts_with("405663"));
        assert!(passes_luhn(&number));
    }

    #[test]
    fn test_from_prefix_strips_formatting() {
        let number = from_prefix_with_rng("4111-11", 16, &mut rng());
        assert!(number.starts_with("411111"));
        assert_eq!(number.len(), 16);
    }

    #[test]
    fn test_from_prefix_oversized_prefix_is_kept() {
        let prefix = "12345678901234567890";
        let number = from_prefix(prefix, 16);
        assert_eq!(number.len(), 21);
        assert!(number.starts_with(prefix));
        assert!(passes_luhn(&number));
    }

    #[test]
    fn test_from_prefix_exact_body_length() {
        let number = from_prefix("411111111111111", 16);
        assert_eq!(number, "4111111111111111");
    }

    #[test]
    fn test_from_prefix_seeded_is_reproducible() {
        assert_eq!(
            from_prefix_with_rng("4", 16, &mut rng()),
            from_prefix_with_rng("4", 16, &mut rng())
        );
    }

    #[test]
    fn test_prefix_table() {
        assert_eq!(prefixes_for(Issuer::Amex), Some(&["34", "37"][..]));
        assert!(prefixes_for(Issuer::Maestro).is_none());
        assert!(prefixes_for(Issuer::Unknown).is_none());
    }

    #[test]
    fn test_random_card_shape() {
        let registry = BinRegistry::builtin();
        let mut rng = rng();
        for _ in 0..200 {
            let card = random_card_with_rng(registry, &GenerateOptions::default(), &mut rng, TODAY);
            let digits = to_digits(card.number());
            assert!(is_checksum_valid(&digits), "{}", card.number());

            let amex = card.issuer() == Issuer::Amex;
            assert_eq!(digits.len(), if amex { 15 } else { 16 });
            assert_eq!(card.cvv().len(), if amex { 4 } else { 3 });
            assert!(!card.cvv().starts_with('0'));

            let expiry = check_expiry(card.expiry(), TODAY).unwrap();
            assert!((27..=31).contains(&expiry.year()));

            assert!(HOLDER_NAMES
                .iter()
                .any(|name| name.to_uppercase() == card.holder()));
        }
    }

    #[test]
    fn test_random_card_for_issuer() {
        let registry = BinRegistry::builtin();
        let mut rng = rng();
        for issuer in [Issuer::Visa, Issuer::Mastercard, Issuer::Amex, Issuer::Jcb, Issuer::Diners] {
            let card = random_card_with_rng(registry, &GenerateOptions::issuer(issuer), &mut rng, TODAY);
            assert_eq!(card.issuer(), issuer, "{}", card.number());
        }
    }

    #[test]
    fn test_issuer_without_prefixes_falls_back_to_visa() {
        let registry = BinRegistry::builtin();
        let card = random_card_with_rng(
            registry,
            &GenerateOptions::issuer(Issuer::Mir),
            &mut rng(),
            TODAY,
        );
        assert!(card.number().starts_with('4'));
        assert_eq!(card.issuer(), Issuer::Visa);
    }

    #[test]
    fn test_random_card_for_country() {
        let registry = BinRegistry::builtin();
        let mut rng = rng();
        for _ in 0..50 {
            let card = random_card_with_rng(registry, &GenerateOptions::country("LK"), &mut rng, TODAY);
            assert_eq!(card.country(), "Sri Lanka");
            assert!(card.bank().is_some());
        }
    }

    #[test]
    fn test_unknown_country_uses_issuer_table() {
        let registry = BinRegistry::builtin();
        let options = GenerateOptions {
            issuer: Some(Issuer::Amex),
            country_code: Some("ZZ".into()),
        };
        let card = random_card_with_rng(registry, &options, &mut rng(), TODAY);
        assert_eq!(card.issuer(), Issuer::Amex);
    }

    #[test]
    fn test_labels_match_re_resolution() {
        let registry = BinRegistry::builtin();
        let mut rng = rng();
        for _ in 0..50 {
            let card = random_card_with_rng(registry, &GenerateOptions::country("US"), &mut rng, TODAY);
            let found = registry.resolve_str(card.number());
            assert_eq!(card.country(), found.country);
            assert_eq!(card.bank(), found.bank.as_deref());
            assert_eq!(card.tier(), found.tier.as_deref());
        }
    }

    #[test]
    fn test_batch_is_clamped() {
        let registry = BinRegistry::builtin();
        let options = GenerateOptions::default();
        assert_eq!(generate_batch_with_rng(registry, &options, 0, &mut rng(), TODAY).len(), 1);
        assert_eq!(generate_batch_with_rng(registry, &options, 3, &mut rng(), TODAY).len(), 3);
        assert_eq!(
            generate_batch_with_rng(registry, &options, 5000, &mut rng(), TODAY).len(),
            MAX_BATCH
        );
    }

    #[test]
    fn test_generate_from_bin() {
        let registry = BinRegistry::builtin();
        let cards = generate_from_bin_with_rng(registry, "405663", 20, None, &mut rng(), TODAY);
        assert_eq!(cards.len(), 20);
        for card in &cards {
            let digits = to_digits(card.number());
            assert_eq!(digits.len(), 16);
            assert!(card.number().starts_with("4056 63"));
            assert!(is_checksum_valid(&digits));
            let cvv: u16 = card.cvv().parse().unwrap();
            assert!((100..=998).contains(&cvv));
            assert_eq!(card.bank(), Some("Commercial Bank"));
            assert_eq!(card.tier(), Some("Visa Gold"));
            assert!(check_expiry(card.expiry(), TODAY).is_ok());
        }
    }

    #[test]
    fn test_random_expiry_near_century_end() {
        let mut rng = rng();
        for today in [YearMonth::new(96, 3), YearMonth::new(99, 1), YearMonth::new(99, 12)] {
            for _ in 0..200 {
                let raw = random_expiry(&mut rng, today);
                let expiry = check_expiry(&raw, today).unwrap();
                assert!(expiry.year() > today.year() || expiry.year() == 99, "{raw}");
            }
        }
    }

    #[test]
    fn test_generate_from_bin_expiry_override() {
        let registry = BinRegistry::builtin();
        let cards = generate_from_bin_with_rng(registry, "4111", 3, Some("12/29"), &mut rng(), TODAY);
        assert!(cards.iter().all(|c| c.expiry() == "12/29"));
        assert!(cards.iter().all(|c| c.country() == "Unknown"));

        let random = generate_from_bin_with_rng(registry, "4111", 1, Some(""), &mut rng(), TODAY);
        assert_ne!(random[0].expiry(), "");
    }

    #[test]
    fn test_to_bulk_line() {
        let registry = BinRegistry::builtin();
        let card = &generate_from_bin_with_rng(registry, "4111", 1, Some("01/30"), &mut rng(), TODAY)[0];
        let line = card.to_bulk_line(Issuer::Visa);
        assert!(line.starts_with("visa,"));
        assert!(line.contains(&format!(",\"{}\",", card.number())));
        assert!(line.ends_with(&format!(",{},01/30", card.cvv())));
    }
}
