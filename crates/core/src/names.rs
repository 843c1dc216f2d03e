//! Username to display-name resolution.

use crate::error::{Error, Result};
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const USERNAME_HEADER: &str = "Username";
const FULL_NAME_HEADER: &str = "Full Name";

/// What to do with a name field whose value is not in the lookup table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissPolicy {
    /// Blank the field.
    #[default]
    Blank,
    /// Keep the original identifier.
    PassThrough,
}

/// Immutable username → full name table.
#[derive(Debug, Clone, Default)]
pub struct NameLookupTable {
    names: HashMap<String, String>,
}

impl NameLookupTable {
    /// Build a table from `(username, full name)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_string(), v.into()))
                .collect(),
        }
    }

    /// Load the table from a CSV file with `Username` and `Full Name` columns.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::LookupTableMissing(format!("{}: {}", path.display(), e))
        })?;
        Self::from_csv_reader(file)
    }

    /// Read the table from CSV. Extra columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::LookupTableMissing(e.to_string()))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| {
                    Error::LookupTableMissing(format!("missing '{}' column", name))
                })
        };
        let username_col = column(USERNAME_HEADER)?;
        let full_name_col = column(FULL_NAME_HEADER)?;

        let mut names = HashMap::new();
        for result in csv_reader.records() {
            let row = result.map_err(|e| Error::LookupTableMissing(e.to_string()))?;
            let username = row.get(username_col).unwrap_or("").trim();
            if username.is_empty() {
                continue;
            }
            let full_name = row.get(full_name_col).unwrap_or("").trim();
            names.insert(username.to_string(), full_name.to_string());
        }

        log::debug!("Loaded {} names", names.len());
        Ok(Self { names })
    }

    /// Display name for a username.
    pub fn get(&self, username: &str) -> Option<&str> {
        self.names.get(username.trim()).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Passes the configured name fields of a record through the lookup table.
#[derive(Debug, Clone)]
pub struct NameResolver<'a> {
    table: &'a NameLookupTable,
    name_fields: &'a [String],
    policy: MissPolicy,
}

impl<'a> NameResolver<'a> {
    /// Create a resolver over the given name fields.
    pub fn new(table: &'a NameLookupTable, name_fields: &'a [String], policy: MissPolicy) -> Self {
        Self {
            table,
            name_fields,
            policy,
        }
    }

    /// Resolve the name fields of one record in place.
    ///
    /// Returns the number of non-blank values that were not in the table.
    pub fn resolve(&self, record: &mut Record) -> usize {
        let mut misses = 0;
        for field in self.name_fields {
            let Some(value) = record.get(field) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            match self.table.get(value) {
                Some(full_name) => {
                    let full_name = full_name.to_string();
                    record.insert(field.as_str(), full_name);
                }
                None => {
                    log::debug!("No display name for '{}' in field '{}'", value, field);
                    misses += 1;
                    if self.policy == MissPolicy::Blank {
                        record.insert(field.as_str(), "");
                    }
                }
            }
        }
        misses
    }

    /// Resolve every record, returning the total number of misses.
    pub fn resolve_all(&self, records: &mut [Record]) -> usize {
        records.iter_mut().map(|r| self.resolve(r)).sum()
    }
}
