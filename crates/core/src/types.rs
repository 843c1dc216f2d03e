//! Domain types shared by the pipeline and the deck backends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical field names used by the built-in report configuration.
pub mod fields {
    pub const KEY: &str = "Key";
    pub const TITLE: &str = "Title";
    pub const DESCRIPTION: &str = "Description";
    pub const STATUS: &str = "Status";
    pub const SPONSOR_DEPARTMENT: &str = "Sponsor Department";
    pub const SPONSOR: &str = "Sponsor";
    pub const PROJECT_MANAGER: &str = "Project Manager";
}

/// Text produced by an empty numeric cell in spreadsheet-style exports.
pub const MISSING_VALUE_SENTINEL: &str = "nan";

/// Written into slots that cannot hold text.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Group label for records whose partition value is blank.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// One normalized row: canonical field name to value.
///
/// A field that is absent is different from a field that is present but
/// empty. Absent fields are skipped by the placeholder mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a field, if the field is present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value of a field, or the empty string when absent.
    pub fn get_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Set a field value, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Whether the field is present (possibly empty).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A record that matched the status taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRecord {
    pub record: Record,

    /// Index of the matched category in the taxonomy.
    pub category: usize,

    /// Index of the matched status within its category.
    pub status: usize,
}

/// Addresses a placeholder in an instantiated layout by its placeholder index.
///
/// Index 0 is the title placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl SlotId {
    pub const TITLE: SlotId = SlotId(0);
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of content a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Title, body, subtitle and generic content placeholders.
    Text,
    /// Picture, chart, table, media and similar placeholders.
    NonText,
}

/// Text read back from one placeholder of a generated slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderText {
    pub slot: SlotId,

    /// Paragraph texts in order. An empty primary paragraph is kept.
    pub paragraphs: Vec<String>,
}

/// A slide read back from a saved deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSnapshot {
    /// 1-based slide number.
    pub number: usize,

    /// Name of the layout the slide was instantiated from, if known.
    pub layout: Option<String>,

    /// Placeholders in document order.
    pub placeholders: Vec<PlaceholderText>,
}

impl SlideSnapshot {
    /// Create an empty snapshot for the given slide number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            layout: None,
            placeholders: Vec::new(),
        }
    }

    /// Paragraphs of a placeholder, if the slide has it.
    pub fn paragraphs(&self, slot: SlotId) -> Option<&[String]> {
        self.placeholders
            .iter()
            .find(|p| p.slot == slot)
            .map(|p| p.paragraphs.as_slice())
    }

    /// Placeholder text with paragraphs joined by newlines.
    pub fn text(&self, slot: SlotId) -> Option<String> {
        self.paragraphs(slot).map(|p| p.join("\n"))
    }

    /// Text of the title placeholder.
    pub fn title(&self) -> Option<String> {
        self.text(SlotId::TITLE)
    }
}

/// All slides of a saved deck, in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSnapshot {
    /// Original filename (without path).
    pub filename: String,

    pub slides: Vec<SlideSnapshot>,
}

impl DeckSnapshot {
    /// Create an empty snapshot.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Titles of all slides; slides without a title placeholder yield `None`.
    pub fn titles(&self) -> Vec<Option<String>> {
        self.slides.iter().map(SlideSnapshot::title).collect()
    }
}
