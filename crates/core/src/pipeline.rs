//! End-to-end run: raw table → groups → one saved deck per group.

use crate::assembler::{AssemblyOptions, DeckAssembler, Progress};
use crate::config::ReportConfig;
use crate::deck::{Deck, DeckTemplate};
use crate::error::{Error, Result};
use crate::names::{NameLookupTable, NameResolver};
use crate::partition::{output_paths, Group, Partitioner};
use crate::schema::{RawTable, SchemaNormalizer};
use crate::summary::RunSummary;
use crate::taxonomy::StatusClassifier;
use std::path::{Path, PathBuf};

/// Drives the whole report for one configuration.
#[derive(Debug, Clone)]
pub struct ReportPipeline<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportPipeline<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Normalize, resolve names, classify and partition the input rows.
    ///
    /// Field-level text transforms all happen here, before classification.
    pub fn prepare(
        &self,
        table: &RawTable,
        names: &NameLookupTable,
        summary: &mut RunSummary,
    ) -> Vec<Group> {
        let mut records = SchemaNormalizer::new(self.config.columns.clone()).normalize(table);
        summary.rows_read += records.len();

        let resolver = NameResolver::new(
            names,
            &self.config.name_fields,
            self.config.name_miss_policy,
        );
        summary.unresolved_names += resolver.resolve_all(&mut records);

        let classifier =
            StatusClassifier::new(&self.config.taxonomy, self.config.status_field.as_str());
        let classification = classifier.classify(records);
        for (status, count) in classification.dropped {
            *summary.dropped_by_status.entry(status).or_insert(0) += count;
        }

        let groups = Partitioner::new(self.config.partition_field.as_str())
            .partition(classification.tagged);
        log::debug!("Partitioned into {} group(s)", groups.len());
        groups
    }

    /// Build and save one deck per group under `prefix`.
    ///
    /// Every layout the report uses is checked against the template before
    /// any deck is written. Returns the saved paths in group order.
    pub fn generate<T: DeckTemplate>(
        &self,
        template: &T,
        groups: &[Group],
        prefix: &Path,
        options: AssemblyOptions,
        progress: &mut dyn Progress,
        summary: &mut RunSummary,
    ) -> Result<Vec<PathBuf>> {
        for layout in self.config.required_layouts(options.double_sided) {
            if !template.has_layout(layout) {
                return Err(Error::LayoutNotFound(layout.to_string()));
            }
        }

        std::fs::create_dir_all(prefix)?;

        let assembler = DeckAssembler::new(self.config, options);
        let mut saved = Vec::with_capacity(groups.len());

        let paths = output_paths(prefix, groups);
        for (group, path) in groups.iter().zip(paths) {
            log::info!(
                "Building deck for '{}' ({} records)",
                group.label,
                group.records.len()
            );

            let mut deck = template.create_deck()?;
            assembler.assemble(&mut deck, group, progress, summary)?;
            summary.slides_written += deck.slide_count();

            deck.save(&path)?;
            log::info!("Saved {}", path.display());

            summary.decks.push(path.clone());
            saved.push(path);
        }

        Ok(saved)
    }
}
