//! JSON BIN registry loader.
//!
//! # Feature
//!
//! Requires the `bin-json` feature.
//!
//! # Supported Formats
//!
//! ## Array format
//!
//! ```json
//! [
//!   {
//!     "country": "Sri Lanka",
//!     "code": "LK",
//!     "bins": [
//!       { "bin": "405663", "bank": "Commercial Bank", "tier": "Visa Gold" },
//!       { "bin": "4056", "bank": "Commercial Bank" }
//!     ]
//!   }
//! ]
//! ```
//!
//! ## Object format (keyed by country code)
//!
//! ```json
//! {
//!   "LK": {
//!     "country": "Sri Lanka",
//!     "bins": [{ "bin": "405663", "bank": "Commercial Bank" }]
//!   }
//! }
//! ```

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use super::{BinDbError, BinEntry, BinRegistry, BinRegistryBuilder, CountryTable};

/// Loads a [`BinRegistry`] from JSON.
pub struct JsonBinLoader;

impl JsonBinLoader {
    /// Loads a registry from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use cardprobe::bindb::JsonBinLoader;
    ///
    /// let registry = JsonBinLoader::from_file("bins.json")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BinRegistry, BinDbError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads a registry from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<BinRegistry, BinDbError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Loads a registry from a JSON string, detecting the format.
    pub fn parse(json: &str) -> Result<BinRegistry, BinDbError> {
        let trimmed = json.trim_start();

        let tables = if trimmed.starts_with('[') {
            Self::parse_array(json)?
        } else if trimmed.starts_with('{') {
            Self::parse_object(json)?
        } else {
            return Err(BinDbError::Parse(
                "Invalid JSON format: expected array or object".to_string(),
            ));
        };

        let builder = tables
            .into_iter()
            .fold(BinRegistryBuilder::new(), |builder, table| builder.country(table));

        if builder.is_empty() {
            return Err(BinDbError::Empty);
        }
        Ok(builder.build())
    }

    fn parse_array(json: &str) -> Result<Vec<CountryTable>, BinDbError> {
        let countries: Vec<JsonCountry> = serde_json::from_str(json)
            .map_err(|e| BinDbError::Parse(format!("JSON parse error: {}", e)))?;

        Ok(countries.into_iter().map(JsonCountry::into_table).collect())
    }

    fn parse_object(json: &str) -> Result<Vec<CountryTable>, BinDbError> {
        let OrderedCountries(entries) = serde_json::from_str(json)
            .map_err(|e| BinDbError::Parse(format!("JSON parse error: {}", e)))?;

        Ok(entries
            .into_iter()
            .map(|(code, mut country)| {
                // The key names the country when the body doesn't
                if country.code.is_empty() {
                    country.code = code;
                }
                country.into_table()
            })
            .collect())
    }
}

/// Code-keyed countries in document order.
struct OrderedCountries(Vec<(String, JsonCountry)>);

impl<'de> Deserialize<'de> for OrderedCountries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedCountries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by country code")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, JsonCountry>()? {
                    entries.push(entry);
                }
                Ok(OrderedCountries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Deserialize)]
struct JsonCountry {
    #[serde(default, alias = "name", alias = "country_name")]
    country: String,

    #[serde(default, alias = "country_code")]
    code: String,

    #[serde(default, alias = "entries")]
    bins: Vec<JsonBin>,
}

#[derive(Debug, Deserialize)]
struct JsonBin {
    #[serde(alias = "prefix", alias = "iin")]
    bin: String,

    #[serde(default, alias = "issuer", alias = "bank_name")]
    bank: Option<String>,

    #[serde(default, alias = "level", alias = "card_level")]
    tier: Option<String>,
}

impl JsonCountry {
    fn into_table(self) -> CountryTable {
        let mut table = CountryTable::new(self.country, self.code);
        for bin in self.bins {
            table.push(BinEntry {
                bank: bin.bank,
                tier: bin.tier,
                ..BinEntry::with_prefix(&bin.bin)
            });
        }
        table
    }
}
