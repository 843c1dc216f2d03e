//! Deck assembly for one partition group.
//!
//! Slide order within a deck:
//!
//! ```text
//! cover (optional)            [spacer]
//! "{group} {category}"        [spacer]
//!     record 1: layout 1, layout 2, ...
//!     record 2: layout 1, layout 2, ...
//! "{group} {next category}"   [spacer]
//!     ...
//! ```
//!
//! Categories follow taxonomy order and are only emitted when the group has
//! records for them. Within a category, records are ordered by status
//! (taxonomy order) and then by the configured sort field.

use crate::config::ReportConfig;
use crate::deck::Deck;
use crate::error::Result;
use crate::mapper::PlaceholderMapper;
use crate::partition::Group;
use crate::summary::{RunSummary, WriteTally};
use crate::text::SlideTextWriter;
use crate::types::TaggedRecord;

/// Receives a tick for every record placed in a deck.
pub trait Progress {
    /// `index` is 1-based within the group.
    fn record_started(&mut self, group: &str, index: usize, total: usize);
}

/// Reports progress through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn record_started(&mut self, group: &str, index: usize, total: usize) {
        log::info!("[{}] Creating approval slide {} of {}", group, index, total);
    }
}

/// Discards progress ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn record_started(&mut self, _group: &str, _index: usize, _total: usize) {}
}

/// Options that vary per run rather than per report.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Insert a blank spacer slide after every title slide.
    pub double_sided: bool,

    /// Subtitle for the cover and section title slides, e.g. a creation date.
    pub subtitle: Option<String>,

    /// Leave out the cover slide even if the report defines one.
    pub skip_cover: bool,
}

/// Builds the slides of one group's deck.
#[derive(Debug, Clone)]
pub struct DeckAssembler<'a> {
    config: &'a ReportConfig,
    options: AssemblyOptions,
    mapper: PlaceholderMapper,
    writer: SlideTextWriter,
}

impl<'a> DeckAssembler<'a> {
    pub fn new(config: &'a ReportConfig, options: AssemblyOptions) -> Self {
        Self {
            config,
            options,
            mapper: PlaceholderMapper::new(config.title_field.as_str()),
            writer: SlideTextWriter::new(),
        }
    }

    /// Append all slides for `group` to `deck`.
    pub fn assemble<D: Deck>(
        &self,
        deck: &mut D,
        group: &Group,
        progress: &mut dyn Progress,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if let Some(cover) = self.config.cover_title.as_deref() {
            if !self.options.skip_cover {
                self.title_slide(deck, cover, summary)?;
            }
        }

        let records = self.ordered(&group.records);
        let total = records.len();
        let mut index = 0;

        for (ci, category) in self.config.taxonomy.categories().iter().enumerate() {
            let in_category: Vec<&TaggedRecord> =
                records.iter().copied().filter(|r| r.category == ci).collect();
            if in_category.is_empty() {
                continue;
            }

            log::debug!(
                "[{}] {}: {} record(s)",
                group.label,
                category.name,
                in_category.len()
            );
            self.title_slide(deck, &format!("{} {}", group.label, category.name), summary)?;

            let layouts = self.config.layouts_for(&category.name);
            for tagged in in_category {
                index += 1;
                progress.record_started(&group.label, index, total);
                for layout in &layouts {
                    let tally = self.mapper.render(deck, layout, &tagged.record)?;
                    summary.writes.merge(tally);
                }
                summary.records_rendered += 1;
            }
        }

        Ok(())
    }

    /// Records in emit order: category, status, then sort field.
    fn ordered<'r>(&self, records: &'r [TaggedRecord]) -> Vec<&'r TaggedRecord> {
        let sort_field = self.config.sort_field.as_str();
        let mut ordered: Vec<&TaggedRecord> = records.iter().collect();
        ordered.sort_by(|a, b| {
            (a.category, a.status, a.record.get_or_empty(sort_field)).cmp(&(
                b.category,
                b.status,
                b.record.get_or_empty(sort_field),
            ))
        });
        ordered
    }

    /// Cover or section title slide, followed by a spacer when double-sided.
    fn title_slide<D: Deck>(&self, deck: &mut D, title: &str, summary: &mut RunSummary) -> Result<()> {
        let layout = &self.config.title_layout;
        let slide = deck.add_slide(&layout.layout)?;

        let mut tally = WriteTally::default();
        tally.record(self.writer.write(slide, layout.title_slot, title));
        if let (Some(slot), Some(subtitle)) = (layout.subtitle_slot, self.options.subtitle.as_deref()) {
            tally.record(self.writer.write(slide, slot, subtitle));
        }
        summary.writes.merge(tally);

        if self.options.double_sided {
            deck.add_slide(&self.config.blank_layout)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::memory::{MemoryDeck, MemoryLayout, MemoryTemplate};
    use crate::deck::DeckTemplate;
    use crate::types::Record;

    fn template() -> MemoryTemplate {
        MemoryTemplate::new(vec![
            MemoryLayout::new("Title Slide", &[0, 1]),
            MemoryLayout::new("Section", &[0]),
            MemoryLayout::new("Overview", &[0, 1, 15, 16, 17, 18, 19, 21, 22, 23, 24, 25, 27]),
            MemoryLayout::new("Detail", &[0, 1, 13, 14, 15, 16, 17]),
            MemoryLayout::new("Blank 1", &[]),
            MemoryLayout::new("Blank 2", &[]),
            MemoryLayout::new("Blank 3", &[]),
            MemoryLayout::new("Blank", &[]),
        ])
    }

    fn tagged(title: &str, category: usize, status: usize) -> TaggedRecord {
        TaggedRecord {
            record: Record::from_pairs([("Title", title), ("Key", title)]),
            category,
            status,
        }
    }

    fn group(records: Vec<TaggedRecord>) -> Group {
        Group {
            label: "Finance".to_string(),
            records,
        }
    }

    fn assemble(options: AssemblyOptions, group: &Group) -> (MemoryDeck, RunSummary) {
        let config = ReportConfig::default();
        let mut deck = template().create_deck().unwrap();
        let mut summary = RunSummary::default();
        DeckAssembler::new(&config, options)
            .assemble(&mut deck, group, &mut NoProgress, &mut summary)
            .unwrap();
        (deck, summary)
    }

    fn titles(deck: &MemoryDeck) -> Vec<String> {
        deck.slides
            .iter()
            .map(|s| format!("{}:{}", s.layout, s.text(0).map(|t| t.join("/")).unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_order_and_lazy_categories() {
        let options = AssemblyOptions {
            subtitle: Some("Created on 01-02-2026".to_string()),
            ..AssemblyOptions::default()
        };
        let group = group(vec![
            tagged("Zeta", 1, 0),
            tagged("Beta", 0, 2),
            tagged("Alpha", 0, 2),
            tagged("Gamma", 0, 0),
            tagged("Parked", 2, 0),
        ]);

        let (deck, summary) = assemble(options, &group);

        assert_eq!(
            titles(&deck),
            vec![
                "Title Slide:Project Approvals",
                "Title Slide:Finance Project Requests",
                "Overview:Gamma",
                "Detail:Gamma",
                "Overview:Alpha",
                "Detail:Alpha",
                "Overview:Beta",
                "Detail:Beta",
                "Title Slide:Finance Approved Projects",
                "Overview:Zeta",
                "Detail:Zeta",
                "Title Slide:Finance Deferred Projects",
                "Overview:Parked",
            ]
        );
        assert_eq!(
            deck.slides[1].text(1),
            Some(&["Created on 01-02-2026".to_string()][..])
        );
        assert_eq!(summary.records_rendered, 5);
    }

    #[test]
    fn test_double_sided_inserts_spacers() {
        let options = AssemblyOptions {
            double_sided: true,
            ..AssemblyOptions::default()
        };
        let group = group(vec![tagged("Only", 3, 1)]);

        let (deck, _) = assemble(options, &group);

        assert_eq!(
            titles(&deck),
            vec![
                "Title Slide:Project Approvals",
                "Blank:",
                "Title Slide:Finance Completed Projects",
                "Blank:",
                "Overview:Only",
                "Detail:Only",
            ]
        );
    }

    #[test]
    fn test_skip_cover() {
        let options = AssemblyOptions {
            skip_cover: true,
            ..AssemblyOptions::default()
        };
        let group = group(vec![tagged("Only", 0, 0)]);

        let (deck, _) = assemble(options, &group);

        assert_eq!(deck.slides[0].text(0), Some(&["Finance Project Requests".to_string()][..]));
        assert_eq!(deck.slide_count(), 3);
    }

    #[test]
    fn test_progress_counts_records() {
        struct Counter(Vec<(usize, usize)>);
        impl Progress for Counter {
            fn record_started(&mut self, _group: &str, index: usize, total: usize) {
                self.0.push((index, total));
            }
        }

        let config = ReportConfig::default();
        let mut deck = template().create_deck().unwrap();
        let mut counter = Counter(Vec::new());
        let group = group(vec![tagged("A", 0, 0), tagged("B", 1, 0)]);

        DeckAssembler::new(&config, AssemblyOptions::default())
            .assemble(&mut deck, &group, &mut counter, &mut RunSummary::default())
            .unwrap();

        assert_eq!(counter.0, vec![(1, 2), (2, 2)]);
    }
}
