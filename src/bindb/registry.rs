//! In-memory BIN registry with longest-prefix resolution.

use std::sync::OnceLock;

use super::{builtin, BinEntry, BinMatch, CountryTable};
use crate::format::to_digits;

/// Immutable BIN registry.
///
/// Holds the country tables in authoring order plus a flattened index of all
/// entries sorted by descending prefix length. Construct one with
/// [`BinRegistryBuilder`], a loader, or use [`BinRegistry::builtin`].
///
/// # Example
///
/// ```
/// use cardprobe::bindb::{BinEntry, BinRegistryBuilder, CountryTable};
///
/// let registry = BinRegistryBuilder::new()
///     .country(
///         CountryTable::new("Testland", "TL")
///             .bin(BinEntry::with_prefix("4111").bank("Fallback Bank"))
///             .bin(BinEntry::with_prefix("411111").bank("Specific Bank")),
///     )
///     .build();
///
/// let found = registry.resolve_str("4111 1111 1111 1111");
/// assert_eq!(found.bank.as_deref(), Some("Specific Bank"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinRegistry {
    countries: Vec<CountryTable>,
    /// All entries, longest prefix first. Equal lengths keep authoring order.
    index: Vec<BinEntry>,
}

impl BinRegistry {
    /// The built-in registry, constructed on first use.
    pub fn builtin() -> &'static BinRegistry {
        static BUILTIN: OnceLock<BinRegistry> = OnceLock::new();
        BUILTIN.get_or_init(builtin::registry)
    }

    /// Returns the most specific entry whose prefix starts `digits`.
    pub fn lookup(&self, digits: &[u8]) -> Option<&BinEntry> {
        if digits.is_empty() {
            return None;
        }
        self.index.iter().find(|entry| entry.matches(digits))
    }

    /// Resolves country, bank and tier for a digit sequence.
    ///
    /// Returns a match with country `"Unknown"` when nothing applies.
    pub fn resolve(&self, digits: &[u8]) -> BinMatch {
        self.lookup(digits).map(BinMatch::from).unwrap_or_default()
    }

    /// Resolves a raw card number string, ignoring non-digits.
    pub fn resolve_str(&self, input: &str) -> BinMatch {
        self.resolve(&to_digits(input))
    }

    /// Returns the country table for `code`, if present.
    pub fn country(&self, code: &str) -> Option<&CountryTable> {
        self.countries.iter().find(|table| table.has_code(code))
    }

    /// Returns the entries authored for `code`, or an empty slice.
    pub fn entries_for(&self, code: &str) -> &[BinEntry] {
        self.country(code).map_or(&[], |table| table.bins.as_slice())
    }

    /// All country tables in authoring order.
    pub fn countries(&self) -> &[CountryTable] {
        &self.countries
    }

    /// Iterates over the flattened index, longest prefix first.
    pub fn iter(&self) -> impl Iterator<Item = &BinEntry> {
        self.index.iter()
    }

    /// Number of entries across all countries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Builder for [`BinRegistry`].
///
/// Tables added under an existing country code are merged into it. The
/// flattened index is sorted once in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct BinRegistryBuilder {
    countries: Vec<CountryTable>,
}

impl BinRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a country table.
    pub fn country(mut self, table: CountryTable) -> Self {
        match self.countries.iter_mut().find(|t| t.has_code(&table.code)) {
            Some(existing) => {
                for entry in table.bins {
                    existing.push(entry);
                }
            }
            None => self.countries.push(table),
        }
        self
    }

    /// Adds a single entry under `country` / `code`, creating the table if
    /// needed.
    pub fn entry(mut self, country: &str, code: &str, entry: BinEntry) -> Self {
        match self.countries.iter_mut().find(|t| t.has_code(code)) {
            Some(existing) => existing.push(entry),
            None => self.countries.push(CountryTable::new(country, code).bin(entry)),
        }
        self
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.countries.iter().map(|t| t.bins.len()).sum()
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens and orders the entries.
    pub fn build(self) -> BinRegistry {
        let mut index: Vec<BinEntry> = self
            .countries
            .iter()
            .flat_map(|table| table.bins.iter().cloned())
            .collect();

        // Stable, so equal-length prefixes keep authoring order.
        index.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        tracing::debug!(
            countries = self.countries.len(),
            entries = index.len(),
            "built BIN registry"
        );

        BinRegistry {
            countries: self.countries,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BinRegistry {
        BinRegistryBuilder::new()
            .country(
                CountryTable::new("Testland", "TL")
                    .bin(BinEntry::with_prefix("41").bank("Short"))
                    .bin(BinEntry::with_prefix("411111").bank("Long").tier("Gold"))
                    .bin(BinEntry::with_prefix("4111").bank("Medium")),
            )
            .country(CountryTable::new("Otherland", "OL").bin(BinEntry::with_prefix("55").bank("Other")))
            .build()
    }

    #[test]
    fn test_longest_prefix_wins() {
        let registry = sample();
        assert_eq!(registry.resolve_str("4111119").bank.as_deref(), Some("Long"));
        assert_eq!(registry.resolve_str("4111229").bank.as_deref(), Some("Medium"));
        assert_eq!(registry.resolve_str("4122229").bank.as_deref(), Some("Short"));
    }

    #[test]
    fn test_index_sorted_by_descending_length() {
        let registry = sample();
        let lengths: Vec<usize> = registry.iter().map(|e| e.prefix.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]), "{lengths:?}");
    }

    #[test]
    fn test_equal_lengths_keep_authoring_order() {
        let registry = BinRegistryBuilder::new()
            .country(CountryTable::new("A", "AA").bin(BinEntry::with_prefix("4111").bank("First")))
            .country(CountryTable::new("B", "BB").bin(BinEntry::with_prefix("4111").bank("Second")))
            .build();
        assert_eq!(registry.resolve_str("41119").bank.as_deref(), Some("First"));
    }

    #[test]
    fn test_no_match() {
        let registry = sample();
        let found = registry.resolve_str("999999");
        assert_eq!(found, BinMatch::unknown());
        assert_eq!(registry.resolve(&[]), BinMatch::unknown());
        // Input shorter than the only candidate prefix
        assert_eq!(registry.resolve(&[5]).country, "Unknown");
    }

    #[test]
    fn test_entries_for() {
        let registry = sample();
        let entries = registry.entries_for("TL");
        assert_eq!(entries.len(), 3);
        // Authoring order, not index order
        assert_eq!(entries[0].prefix, "41");
        assert_eq!(registry.entries_for("tl").len(), 3);
        assert!(registry.entries_for("ZZ").is_empty());
    }

    #[test]
    fn test_builder_merges_country_codes() {
        let registry = BinRegistryBuilder::new()
            .entry("Testland", "TL", BinEntry::with_prefix("41"))
            .entry("Testland", "TL", BinEntry::with_prefix("42"))
            .country(CountryTable::new("Testland", "TL").bin(BinEntry::with_prefix("43")))
            .build();
        assert_eq!(registry.countries().len(), 1);
        assert_eq!(registry.entries_for("TL").len(), 3);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry() {
        let registry = BinRegistryBuilder::new().build();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve_str("4111111111111111").country, "Unknown");
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = BinRegistry::builtin() as *const BinRegistry;
        let b = BinRegistry::builtin() as *const BinRegistry;
        assert_eq!(a, b);
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BinRegistry>();
    }
}
