//! Slide layout descriptors: which template layout to use and where each
//! canonical field goes on it.

use crate::error::{Error, Result};
use crate::types::SlotId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a layout of the template, by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutRef {
    /// 0-based position in the template's layout list.
    Index(usize),
    /// Layout name as shown in the slide master view.
    Name(String),
}

impl fmt::Display for LayoutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutRef::Index(i) => write!(f, "#{}", i),
            LayoutRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Where a field is written: one placeholder, or the same value into several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    Single(SlotId),
    Multiple(Vec<SlotId>),
}

impl Slot {
    /// All physical targets of this slot.
    pub fn targets(&self) -> &[SlotId] {
        match self {
            Slot::Single(slot) => std::slice::from_ref(slot),
            Slot::Multiple(slots) => slots,
        }
    }
}

impl From<u32> for Slot {
    fn from(idx: u32) -> Self {
        Slot::Single(SlotId(idx))
    }
}

/// One entry of a field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub field: String,
    pub slot: Slot,
}

/// A template layout plus the field → slot mapping used for every record
/// placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub layout: LayoutRef,

    /// Placeholder that receives the record's title, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_slot: Option<SlotId>,

    /// Field mapping in write order.
    #[serde(default)]
    pub fields: Vec<FieldSlot>,
}

impl LayoutDescriptor {
    /// Create a descriptor with no title slot and an empty mapping.
    pub fn new(layout: LayoutRef) -> Self {
        Self {
            layout,
            title_slot: None,
            fields: Vec::new(),
        }
    }

    /// Write the record title into `slot`.
    pub fn with_title(mut self, slot: SlotId) -> Self {
        self.title_slot = Some(slot);
        self
    }

    /// Map a field to a slot.
    pub fn map(mut self, field: impl Into<String>, slot: impl Into<Slot>) -> Self {
        self.fields.push(FieldSlot {
            field: field.into(),
            slot: slot.into(),
        });
        self
    }

    /// Slot of a field, if mapped.
    pub fn slot_for(&self, field: &str) -> Option<&Slot> {
        self.fields.iter().find(|f| f.field == field).map(|f| &f.slot)
    }

    /// Check that every field is mapped once and no multi-slot is empty.
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.field == entry.field) {
                return Err(Error::ConfigError(format!(
                    "field '{}' is mapped twice on layout {}",
                    entry.field, self.layout
                )));
            }
            if entry.slot.targets().is_empty() {
                return Err(Error::ConfigError(format!(
                    "field '{}' has no target slots on layout {}",
                    entry.field, self.layout
                )));
            }
        }
        Ok(())
    }
}

/// Layout used for the cover slide and section title slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLayout {
    pub layout: LayoutRef,

    #[serde(default = "default_title_slot")]
    pub title_slot: SlotId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_slot: Option<SlotId>,
}

fn default_title_slot() -> SlotId {
    SlotId::TITLE
}
