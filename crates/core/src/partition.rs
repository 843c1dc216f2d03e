//! Partitioning of classified records into one group per output deck.

use crate::types::{TaggedRecord, UNKNOWN_GROUP};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Characters that may not appear in a group's file-name label.
static NON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

/// Records that share one partition value.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    pub records: Vec<TaggedRecord>,
}

/// Groups tagged records by the value of one field.
#[derive(Debug, Clone)]
pub struct Partitioner {
    field: String,
}

impl Partitioner {
    /// Create a partitioner on `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Split records into groups ordered by label.
    ///
    /// Blank and absent partition values form the "Unknown" group. Record
    /// order within a group follows input order.
    pub fn partition(&self, records: Vec<TaggedRecord>) -> Vec<Group> {
        let mut groups: BTreeMap<String, Vec<TaggedRecord>> = BTreeMap::new();
        for tagged in records {
            let label = group_label(tagged.record.get(&self.field));
            groups.entry(label).or_default().push(tagged);
        }

        groups
            .into_iter()
            .map(|(label, records)| Group { label, records })
            .collect()
    }
}

/// Group label for a partition value.
pub fn group_label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_GROUP.to_string(),
    }
}

/// File-name form of a group label: every non-alphanumeric character
/// becomes an underscore.
pub fn file_label(label: &str) -> String {
    NON_WORD_REGEX.replace_all(label, "_").into_owned()
}

/// Output path for a group: `{prefix}/{basename(prefix)}_{label}.pptx`.
pub fn output_path(prefix: &Path, label: &str) -> PathBuf {
    let base = prefix
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck");

    prefix.join(format!("{}_{}.pptx", base, file_label(label)))
}

/// One distinct output path per group, in group order.
///
/// Labels that normalize to the same file name get a numeric suffix
/// (`_2`, `_3`, ...) after the first.
pub fn output_paths(prefix: &Path, groups: &[Group]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .map(|group| {
            let mut path = output_path(prefix, &group.label);
            let mut n = 2;
            while !seen.insert(path.clone()) {
                path = output_path(prefix, &format!("{}_{}", group.label, n));
                n += 1;
            }
            if n > 2 {
                log::warn!(
                    "Group '{}' shares a file name with another group, writing {}",
                    group.label,
                    path.display()
                );
            }
            path
        })
        .collect()
}
