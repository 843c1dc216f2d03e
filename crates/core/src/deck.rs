//! The slide deck capability the pipeline writes into.
//!
//! The pipeline never creates layouts. It instantiates slides from layouts
//! the template already has and fills their placeholders with text.

use crate::error::Result;
use crate::layout::LayoutRef;
use crate::types::{SlotId, SlotKind};
use std::path::Path;

/// A slide instantiated from a template layout.
pub trait Slide {
    /// Kind of the placeholder at `slot`, or `None` if the layout has no such
    /// placeholder.
    fn slot_kind(&self, slot: SlotId) -> Option<SlotKind>;

    /// Replace the text of a placeholder with the given paragraphs.
    ///
    /// Writing to a slot that does not exist is a no-op.
    fn set_paragraphs(&mut self, slot: SlotId, paragraphs: Vec<String>);
}

/// A deck being built for one partition group.
pub trait Deck {
    type Slide: Slide;

    /// Append a slide instantiated from `layout`.
    ///
    /// Fails with [`Error::LayoutNotFound`](crate::Error::LayoutNotFound)
    /// when the template has no such layout.
    fn add_slide(&mut self, layout: &LayoutRef) -> Result<&mut Self::Slide>;

    /// Number of slides appended so far.
    fn slide_count(&self) -> usize;

    /// Persist the deck. A deck is saved exactly once.
    fn save(self, path: &Path) -> Result<()>;
}

/// Source of fresh decks, one per partition group.
pub trait DeckTemplate {
    type Deck: Deck;

    /// Start a new deck from the template.
    fn create_deck(&self) -> Result<Self::Deck>;

    /// Whether the template provides `layout`.
    fn has_layout(&self, layout: &LayoutRef) -> bool;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory deck used by the core tests.

    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    pub struct MemoryLayout {
        pub name: String,
        pub slots: BTreeMap<SlotId, SlotKind>,
    }

    impl MemoryLayout {
        pub fn new(name: &str, text_slots: &[u32]) -> Self {
            Self {
                name: name.to_string(),
                slots: text_slots
                    .iter()
                    .map(|&s| (SlotId(s), SlotKind::Text))
                    .collect(),
            }
        }

        pub fn with_non_text(mut self, slot: u32) -> Self {
            self.slots.insert(SlotId(slot), SlotKind::NonText);
            self
        }
    }

    #[derive(Debug, Clone)]
    pub struct MemorySlide {
        pub layout: String,
        pub slots: BTreeMap<SlotId, SlotKind>,
        pub text: BTreeMap<SlotId, Vec<String>>,
    }

    impl MemorySlide {
        pub fn text(&self, slot: u32) -> Option<&[String]> {
            self.text.get(&SlotId(slot)).map(Vec::as_slice)
        }
    }

    impl Slide for MemorySlide {
        fn slot_kind(&self, slot: SlotId) -> Option<SlotKind> {
            self.slots.get(&slot).copied()
        }

        fn set_paragraphs(&mut self, slot: SlotId, paragraphs: Vec<String>) {
            if self.slots.contains_key(&slot) {
                self.text.insert(slot, paragraphs);
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct MemoryDeck {
        layouts: Vec<MemoryLayout>,
        pub slides: Vec<MemorySlide>,
        saved: Rc<RefCell<Vec<(PathBuf, Vec<MemorySlide>)>>>,
    }

    impl Deck for MemoryDeck {
        type Slide = MemorySlide;

        fn add_slide(&mut self, layout: &LayoutRef) -> Result<&mut MemorySlide> {
            let found = match layout {
                LayoutRef::Index(i) => self.layouts.get(*i),
                LayoutRef::Name(name) => self.layouts.iter().find(|l| &l.name == name),
            }
            .ok_or_else(|| Error::LayoutNotFound(layout.to_string()))?;

            self.slides.push(MemorySlide {
                layout: found.name.clone(),
                slots: found.slots.clone(),
                text: BTreeMap::new(),
            });
            Ok(self.slides.last_mut().expect("slide was just pushed"))
        }

        fn slide_count(&self) -> usize {
            self.slides.len()
        }

        fn save(self, path: &Path) -> Result<()> {
            self.saved
                .borrow_mut()
                .push((path.to_path_buf(), self.slides));
            Ok(())
        }
    }

    /// Template whose saved decks can be inspected after a run.
    #[derive(Debug, Default)]
    pub struct MemoryTemplate {
        pub layouts: Vec<MemoryLayout>,
        pub saved: Rc<RefCell<Vec<(PathBuf, Vec<MemorySlide>)>>>,
    }

    impl MemoryTemplate {
        pub fn new(layouts: Vec<MemoryLayout>) -> Self {
            Self {
                layouts,
                saved: Rc::default(),
            }
        }

        pub fn saved(&self) -> Vec<(PathBuf, Vec<MemorySlide>)> {
            self.saved.borrow().clone()
        }
    }

    impl DeckTemplate for MemoryTemplate {
        type Deck = MemoryDeck;

        fn create_deck(&self) -> Result<MemoryDeck> {
            Ok(MemoryDeck {
                layouts: self.layouts.clone(),
                slides: Vec::new(),
                saved: Rc::clone(&self.saved),
            })
        }

        fn has_layout(&self, layout: &LayoutRef) -> bool {
            match layout {
                LayoutRef::Index(i) => *i < self.layouts.len(),
                LayoutRef::Name(name) => self.layouts.iter().any(|l| &l.name == name),
            }
        }
    }
}
