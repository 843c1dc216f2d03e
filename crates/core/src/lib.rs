//! Core pipeline for generating project-approval slide decks: column
//! mapping, name resolution, status bucketing, placeholder mapping and
//! per-group deck assembly.

pub mod assembler;
pub mod config;
pub mod deck;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod names;
pub mod partition;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod taxonomy;
pub mod text;
pub mod types;

pub use assembler::{AssemblyOptions, DeckAssembler, LogProgress, NoProgress, Progress};
pub use config::ReportConfig;
pub use deck::{Deck, DeckTemplate, Slide};
pub use error::{Error, Result};
pub use layout::{FieldSlot, LayoutDescriptor, LayoutRef, Slot, TitleLayout};
pub use mapper::{PlaceholderMapper, TextPlans};
pub use names::{MissPolicy, NameLookupTable, NameResolver};
pub use partition::{output_path, output_paths, Group, Partitioner};
pub use pipeline::ReportPipeline;
pub use schema::{ColumnMapping, RawTable, SchemaNormalizer};
pub use summary::{RunSummary, WriteOutcome, WriteTally};
pub use taxonomy::{Classification, StatusCategory, StatusClassifier, StatusTaxonomy};
pub use text::SlideTextWriter;
pub use types::{
    DeckSnapshot, PlaceholderText, Record, SlideSnapshot, SlotId, SlotKind, TaggedRecord,
};
