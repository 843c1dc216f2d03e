//! PPTX (Office Open XML) backend for approval decks.
//!
//! Loads a template presentation, instantiates slides from its layouts and
//! writes each deck as a copy of the template package with the new slides
//! appended. [`DeckReader`] reads saved decks back for inspection.

mod package;
pub mod reader;
pub mod slide;
pub mod template;
pub mod writer;
mod xml;

pub use reader::DeckReader;
pub use slide::PptxSlide;
pub use template::{LayoutInfo, PlaceholderInfo, PptxTemplate};
pub use writer::PptxDeck;
