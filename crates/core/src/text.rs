//! Slide text writer: turns a field value into placeholder paragraphs.
//!
//! - The first line is the primary paragraph. The missing-value sentinel
//!   (`nan`) is written as an empty primary paragraph.
//! - Every following non-empty line becomes one more paragraph.
//! - Slots that cannot hold text receive "Not Available".
//! - Slots the layout does not have are left alone.

use crate::deck::Slide;
use crate::summary::WriteOutcome;
use crate::types::{SlotId, SlotKind, MISSING_VALUE_SENTINEL, NOT_AVAILABLE};

/// Split a value into the paragraphs written to a slot.
///
/// Always returns at least the primary paragraph.
pub fn paragraphs(value: &str) -> Vec<String> {
    if value == MISSING_VALUE_SENTINEL {
        return vec![String::new()];
    }

    let mut lines = value.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let primary = lines.next().unwrap_or_default().to_string();

    std::iter::once(primary)
        .chain(lines.filter(|l| !l.is_empty()).map(str::to_string))
        .collect()
}

/// Writes values into slide slots following the paragraph policy above.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideTextWriter;

impl SlideTextWriter {
    /// Create a new text writer.
    pub fn new() -> Self {
        Self
    }

    /// Write a value into one slot.
    pub fn write<S: Slide + ?Sized>(&self, slide: &mut S, slot: SlotId, value: &str) -> WriteOutcome {
        self.write_paragraphs(slide, slot, paragraphs(value))
    }

    /// Write pre-split paragraphs into one slot.
    pub fn write_paragraphs<S: Slide + ?Sized>(
        &self,
        slide: &mut S,
        slot: SlotId,
        paragraphs: Vec<String>,
    ) -> WriteOutcome {
        match slide.slot_kind(slot) {
            None => {
                log::trace!("Slot {} not on layout, skipping", slot);
                WriteOutcome::SlotMissing
            }
            Some(SlotKind::NonText) => {
                log::debug!("Slot {} cannot hold text, writing fallback", slot);
                slide.set_paragraphs(slot, vec![NOT_AVAILABLE.to_string()]);
                WriteOutcome::TypeMismatch
            }
            Some(SlotKind::Text) => {
                slide.set_paragraphs(slot, paragraphs);
                WriteOutcome::Written
            }
        }
    }
}
