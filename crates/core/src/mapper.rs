//! Placeholder mapper: projects a record onto a layout's slots.

use crate::deck::Deck;
use crate::error::Result;
use crate::layout::{LayoutDescriptor, Slot};
use crate::summary::WriteTally;
use crate::text::{paragraphs, SlideTextWriter};
use crate::types::Record;
use std::collections::HashMap;

/// Caller-supplied text for multi-target slots: field name to one text per
/// target, in target order.
pub type TextPlans = HashMap<String, Vec<String>>;

/// Instantiates layouts and fills them from one record at a time.
#[derive(Debug, Clone)]
pub struct PlaceholderMapper {
    title_field: String,
    writer: SlideTextWriter,
}

impl PlaceholderMapper {
    /// Create a mapper that takes slide titles from `title_field`.
    pub fn new(title_field: impl Into<String>) -> Self {
        Self {
            title_field: title_field.into(),
            writer: SlideTextWriter::new(),
        }
    }

    /// Append a slide for `layout` to the deck and populate it from `record`.
    pub fn render<D: Deck>(
        &self,
        deck: &mut D,
        layout: &LayoutDescriptor,
        record: &Record,
    ) -> Result<WriteTally> {
        self.render_with_plans(deck, layout, record, &TextPlans::new())
    }

    /// Like [`render`](Self::render), with explicit per-target text for
    /// some multi-target fields.
    ///
    /// Without a plan every target of a multi-target slot receives the
    /// value's first line. With a plan, target `i` receives plan entry `i`,
    /// and targets beyond the plan receive empty text.
    pub fn render_with_plans<D: Deck>(
        &self,
        deck: &mut D,
        layout: &LayoutDescriptor,
        record: &Record,
        plans: &TextPlans,
    ) -> Result<WriteTally> {
        let slide = deck.add_slide(&layout.layout)?;
        let mut tally = WriteTally::default();

        if let Some(title_slot) = layout.title_slot {
            match record.get(&self.title_field) {
                Some(title) => tally.record(self.writer.write(slide, title_slot, title)),
                None => tally.missing_field += 1,
            }
        }

        for entry in &layout.fields {
            let Some(value) = record.get(&entry.field) else {
                log::trace!("Field '{}' absent from record", entry.field);
                tally.missing_field += 1;
                continue;
            };

            match (&entry.slot, plans.get(&entry.field)) {
                (Slot::Multiple(targets), Some(plan)) => {
                    for (i, &target) in targets.iter().enumerate() {
                        let text = plan.get(i).map(String::as_str).unwrap_or("");
                        tally.record(self.writer.write(slide, target, text));
                    }
                }
                (Slot::Multiple(targets), None) => {
                    let mut text = paragraphs(value);
                    text.truncate(1);
                    for &target in targets {
                        tally.record(self.writer.write_paragraphs(slide, target, text.clone()));
                    }
                }
                (Slot::Single(target), _) => {
                    tally.record(self.writer.write(slide, *target, value));
                }
            }
        }

        Ok(tally)
    }
}
