//! CSV BIN registry loader.
//!
//! # Feature
//!
//! Requires the `bin-csv` feature.
//!
//! # Supported Format
//!
//! ```csv
//! country,code,bin,bank,tier
//! Sri Lanka,LK,405663,Commercial Bank,Visa Gold
//! Sri Lanka,LK,4056,Commercial Bank,Visa
//! India,IN,6070,HDFC,Rupay
//! ```
//!
//! One entry per row. Rows are grouped into country tables by code, in the
//! order codes first appear. Column order doesn't matter as long as headers
//! are present; `code` and `bin` are required.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{BinDbError, BinEntry, BinRegistry, BinRegistryBuilder};

/// Loads a [`BinRegistry`] from CSV with a header row.
pub struct CsvBinLoader;

impl CsvBinLoader {
    /// Loads a registry from a CSV file.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use cardprobe::bindb::CsvBinLoader;
    ///
    /// let registry = CsvBinLoader::from_file("bins.csv")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BinRegistry, BinDbError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads a registry from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<BinRegistry, BinDbError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| BinDbError::Parse(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let col_map = ColumnMap::from_headers(&headers)?;
        let mut builder = BinRegistryBuilder::new();

        for result in csv_reader.records() {
            let record =
                result.map_err(|e| BinDbError::Parse(format!("CSV parse error: {}", e)))?;

            match col_map.parse_record(&record) {
                Some((country, code, entry)) => builder = builder.entry(&country, &code, entry),
                None => tracing::warn!(
                    line = record.position().map(|p| p.line()),
                    "skipping CSV row without code or bin"
                ),
            }
        }

        if builder.is_empty() {
            return Err(BinDbError::Empty);
        }
        Ok(builder.build())
    }

    /// Loads a registry from a CSV string.
    pub fn parse(csv: &str) -> Result<BinRegistry, BinDbError> {
        Self::from_reader(csv.as_bytes())
    }
}

/// Maps CSV column names to indices.
struct ColumnMap {
    country: Option<usize>,
    code: usize,
    bin: usize,
    bank: Option<usize>,
    tier: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, BinDbError> {
        let mut country_col = None;
        let mut code_col = None;
        let mut bin_col = None;
        let mut bank_col = None;
        let mut tier_col = None;

        for (i, header) in headers.iter().enumerate() {
            match header.to_lowercase().trim() {
                "country" | "country_name" => country_col = Some(i),
                "code" | "country_code" => code_col = Some(i),
                "bin" | "iin" | "prefix" => bin_col = Some(i),
                "bank" | "issuer" | "bank_name" => bank_col = Some(i),
                "tier" | "level" | "card_level" => tier_col = Some(i),
                _ => {}
            }
        }

        let code = code_col
            .ok_or_else(|| BinDbError::Parse("Missing required 'code' column".to_string()))?;
        let bin = bin_col
            .ok_or_else(|| BinDbError::Parse("Missing required 'bin' column".to_string()))?;

        Ok(Self {
            country: country_col,
            code,
            bin,
            bank: bank_col,
            tier: tier_col,
        })
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Option<(String, String, BinEntry)> {
        let get_field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let code = get_field(Some(self.code))?;
        let bin = get_field(Some(self.bin))?;
        let country = get_field(self.country).unwrap_or_else(|| code.clone());

        let entry = BinEntry {
            bank: get_field(self.bank),
            tier: get_field(self.tier),
            ..BinEntry::with_prefix(&bin)
        };

        Some((country, code, entry))
    }
}
