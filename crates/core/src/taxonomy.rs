//! Status taxonomy and the classifier that buckets records by status.

use crate::error::{Error, Result};
use crate::types::{Record, TaggedRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A named phase and the workflow statuses that belong to it, in emit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCategory {
    pub name: String,
    pub statuses: Vec<String>,
}

impl StatusCategory {
    pub fn new<S: Into<String>>(name: impl Into<String>, statuses: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered categories of ordered status labels.
///
/// A status label belongs to at most one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusTaxonomy {
    categories: Vec<StatusCategory>,
}

impl StatusTaxonomy {
    /// Build and validate a taxonomy.
    pub fn new(categories: Vec<StatusCategory>) -> Result<Self> {
        let taxonomy = Self { categories };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Check that no status label or category name is repeated.
    pub fn validate(&self) -> Result<()> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.name == category.name) {
                return Err(Error::ConfigError(format!(
                    "category '{}' is declared twice",
                    category.name
                )));
            }
            for status in &category.statuses {
                if let Some(owner) = owners.insert(status.as_str(), category.name.as_str()) {
                    return Err(Error::ConfigError(format!(
                        "status '{}' appears in both '{}' and '{}'",
                        status, owner, category.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Categories in emit order.
    pub fn categories(&self) -> &[StatusCategory] {
        &self.categories
    }

    /// Index of a category by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }
}

/// Records split into those that matched the taxonomy and those that did not.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub tagged: Vec<TaggedRecord>,

    /// Dropped record count per unrecognized status value.
    pub dropped: BTreeMap<String, usize>,
}

impl Classification {
    /// Total number of dropped records.
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Tags records with their (category, status) position in a taxonomy.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    status_field: String,
    labels: HashMap<String, (usize, usize)>,
}

impl StatusClassifier {
    /// Build the label lookup once for the whole run.
    pub fn new(taxonomy: &StatusTaxonomy, status_field: impl Into<String>) -> Self {
        let labels = taxonomy
            .categories()
            .iter()
            .enumerate()
            .flat_map(|(ci, category)| {
                category
                    .statuses
                    .iter()
                    .enumerate()
                    .map(move |(si, status)| (status.clone(), (ci, si)))
            })
            .collect();

        Self {
            status_field: status_field.into(),
            labels,
        }
    }

    /// Position of a status label, matched exactly and case-sensitively.
    pub fn lookup(&self, status: &str) -> Option<(usize, usize)> {
        self.labels.get(status).copied()
    }

    /// Tag one record, or give it back if its status is not recognized.
    pub fn classify_one(&self, record: Record) -> std::result::Result<TaggedRecord, Record> {
        match record.get(&self.status_field).and_then(|s| self.lookup(s)) {
            Some((category, status)) => Ok(TaggedRecord {
                record,
                category,
                status,
            }),
            None => Err(record),
        }
    }

    /// Tag all records, dropping and counting those with unknown statuses.
    pub fn classify(&self, records: Vec<Record>) -> Classification {
        let mut classification = Classification::default();
        for record in records {
            match self.classify_one(record) {
                Ok(tagged) => classification.tagged.push(tagged),
                Err(record) => {
                    let status = record.get_or_empty(&self.status_field).to_string();
                    log::debug!("Dropping record with unrecognized status '{}'", status);
                    *classification.dropped.entry(status).or_insert(0) += 1;
                }
            }
        }
        classification
    }
}
