//! Schema normalization: raw export headers to canonical field names.
//!
//! Headers not present in the [`ColumnMapping`] are dropped. Cell text is
//! cleaned on the way through: Unicode NFC, line endings normalized to `\n`,
//! trailing whitespace removed from every line.

use crate::error::{Error, Result};
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use unicode_normalization::UnicodeNormalization;

/// Static mapping from raw source header to canonical field name.
///
/// Each canonical field may be fed by at most one raw header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<String, String>,
}

impl ColumnMapping {
    /// Build a mapping from `(raw header, canonical field)` pairs.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut columns = BTreeMap::new();
        for (raw, canonical) in pairs {
            let raw = raw.into();
            if columns.insert(raw.clone(), canonical.into()).is_some() {
                return Err(Error::ConfigError(format!(
                    "raw header '{}' is mapped twice",
                    raw
                )));
            }
        }
        let mapping = Self { columns };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Reject mappings where two raw headers feed the same canonical field.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (raw, canonical) in &self.columns {
            if let Some(other) = seen.insert(canonical.as_str(), raw.as_str()) {
                return Err(Error::ConfigError(format!(
                    "canonical field '{}' is fed by both '{}' and '{}'",
                    canonical, other, raw
                )));
            }
        }
        Ok(())
    }

    /// Canonical name for a raw header, if mapped.
    pub fn canonical(&self, raw_header: &str) -> Option<&str> {
        self.columns.get(raw_header).map(String::as_str)
    }

    /// Number of mapped headers.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no header is mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Rows as read from the source, before any renaming.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a CSV document whose first row is the header.
    ///
    /// Rows may be shorter or longer than the header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        log::debug!("Read {} rows with {} columns", rows.len(), headers.len());

        Ok(Self { headers, rows })
    }
}

/// Renames and cleans raw rows into [`Record`]s.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    mapping: ColumnMapping,
}

impl SchemaNormalizer {
    /// Create a normalizer for the given column mapping.
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    /// Normalize every row of a raw table.
    ///
    /// When a raw header occurs more than once, its first occurrence wins.
    pub fn normalize(&self, table: &RawTable) -> Vec<Record> {
        // (column index, canonical name) for every mapped column.
        let mut targets: Vec<(usize, &str)> = Vec::new();
        for (index, header) in table.headers.iter().enumerate() {
            if let Some(canonical) = self.mapping.canonical(header) {
                if targets.iter().all(|(_, c)| *c != canonical) {
                    targets.push((index, canonical));
                }
            }
        }

        let dropped = table.headers.len() - targets.len();
        if dropped > 0 {
            log::debug!("Dropping {} unmapped columns", dropped);
        }

        table
            .rows
            .iter()
            .map(|row| {
                Record::from_pairs(targets.iter().map(|&(index, canonical)| {
                    let raw = row.get(index).map(String::as_str).unwrap_or("");
                    (canonical, clean_cell(raw))
                }))
            })
            .collect()
    }
}

/// Clean a cell: NFC, `\n` line endings, no trailing whitespace on any line
/// and no trailing blank lines. Leading text, including a blank first line,
/// is kept.
pub fn clean_cell(raw: &str) -> String {
    let text: String = raw.replace("\r\n", "\n").replace('\r', "\n").nfc().collect();

    text.split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}
