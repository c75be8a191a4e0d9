//! Built-in BIN data.

use super::{BinEntry, BinRegistry, BinRegistryBuilder, CountryTable};

type Row = (&'static str, &'static str, &'static str);

// prefix, bank, tier
const SRI_LANKA: &[Row] = &[
    ("405663", "Commercial Bank", "Visa Gold"),
    ("405664", "Commercial Bank", "Visa Platinum"),
    ("426391", "HNB", "Visa Classic"),
    ("451314", "HNB", "Visa Gold"),
    ("406065", "Sampath Bank", "Visa Classic"),
    ("412492", "Sampath Bank", "Visa Platinum"),
    ("400079", "Bank of Ceylon", "Visa Debit"),
    ("412495", "Bank of Ceylon", "Visa Gold"),
    ("421673", "Peoples Bank", "Visa Classic"),
    ("483584", "Peoples Bank", "Visa Gold"),
    ("377242", "NTB", "Amex Green"),
    ("377243", "NTB", "Amex Gold"),
    ("454313", "Seylan Bank", "Visa Classic"),
    ("523908", "Commercial Bank", "Mastercard Standard"),
    ("542911", "Sampath Bank", "Mastercard Gold"),
    ("513361", "HNB", "Mastercard Platinum"),
    ("532890", "Bank of Ceylon", "Mastercard Standard"),
    ("545621", "Seylan Bank", "Mastercard Platinum"),
    ("4056", "Commercial Bank", "Visa"),
    ("4060", "Sampath Bank", "Visa"),
    ("4124", "Sri Lanka Generic", "Visa"),
    ("5239", "Commercial Bank", "Mastercard"),
];

const UNITED_STATES: &[Row] = &[
    ("4147", "Chase", "Visa Signature"),
    ("4246", "Wells Fargo", "Visa Classic"),
    ("5100", "Citibank", "Mastercard World"),
    ("3400", "American Express", "Amex Centurion"),
];

const UNITED_KINGDOM: &[Row] = &[
    ("4751", "Barclays", "Visa Debit"),
    ("5412", "HSBC", "Mastercard Gold"),
];

const INDIA: &[Row] = &[("4315", "SBI", "Visa Classic"), ("6070", "HDFC", "Rupay")];

const COUNTRIES: &[(&str, &str, &[Row])] = &[
    ("Sri Lanka", "LK", SRI_LANKA),
    ("United States", "US", UNITED_STATES),
    ("United Kingdom", "GB", UNITED_KINGDOM),
    ("India", "IN", INDIA),
];

pub(super) fn registry() -> BinRegistry {
    COUNTRIES
        .iter()
        .fold(BinRegistryBuilder::new(), |builder, &(name, code, rows)| {
            let table = rows
                .iter()
                .fold(CountryTable::new(name, code), |table, &(prefix, bank, tier)| {
                    table.bin(BinEntry::with_prefix(prefix).bank(bank).tier(tier))
                });
            builder.country(table)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contents() {
        let registry = registry();
        let codes: Vec<&str> = registry.countries().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["LK", "US", "GB", "IN"]);
        assert_eq!(registry.entries_for("LK").len(), 22);
        assert_eq!(registry.len(), 22 + 4 + 2 + 2);
    }

    #[test]
    fn test_specific_bin_beats_fallback() {
        let registry = registry();
        let found = registry.resolve_str("4056630000000000");
        assert_eq!(found.country, "Sri Lanka");
        assert_eq!(found.code.as_deref(), Some("LK"));
        assert_eq!(found.bank.as_deref(), Some("Commercial Bank"));
        assert_eq!(found.tier.as_deref(), Some("Visa Gold"));

        let fallback = registry.resolve_str("4056990000000000");
        assert_eq!(fallback.tier.as_deref(), Some("Visa"));
    }

    #[test]
    fn test_other_countries() {
        let registry = registry();
        assert_eq!(registry.resolve_str("4147 0000 0000 0000").bank.as_deref(), Some("Chase"));
        assert_eq!(registry.resolve_str("5412000000000000").country, "United Kingdom");
        assert_eq!(registry.resolve_str("6070000000000000").tier.as_deref(), Some("Rupay"));
        assert_eq!(registry.resolve_str("4111111111111111").country, "Unknown");
    }
}
