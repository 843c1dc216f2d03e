//! Run summary: what was generated and what was skipped, and why.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of writing one value into one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value was written as text.
    Written,
    /// The layout has no such slot; nothing was written.
    SlotMissing,
    /// The slot cannot hold text; the "Not Available" fallback was written.
    TypeMismatch,
}

/// Per-reason counts of slot writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteTally {
    pub written: usize,
    pub missing_field: usize,
    pub missing_slot: usize,
    pub type_mismatch: usize,
}

impl WriteTally {
    /// Count one write outcome.
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::SlotMissing => self.missing_slot += 1,
            WriteOutcome::TypeMismatch => self.type_mismatch += 1,
        }
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: WriteTally) {
        self.written += other.written;
        self.missing_field += other.missing_field;
        self.missing_slot += other.missing_slot;
        self.type_mismatch += other.type_mismatch;
    }
}

/// Totals for a whole generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Rows read from the input table.
    pub rows_read: usize,

    /// Name-field values with no entry in the lookup table.
    pub unresolved_names: usize,

    /// Records dropped per unrecognized status value.
    pub dropped_by_status: BTreeMap<String, usize>,

    /// Records that received their layouts.
    pub records_rendered: usize,

    /// Slides appended across all decks, including title and spacer slides.
    pub slides_written: usize,

    pub writes: WriteTally,

    /// Saved decks, in the order they were written.
    pub decks: Vec<PathBuf>,
}

impl RunSummary {
    /// Total records dropped by the status classifier.
    pub fn dropped_total(&self) -> usize {
        self.dropped_by_status.values().sum()
    }

    /// Log the summary at info level, with skips at warn level.
    pub fn log(&self) {
        log::info!(
            "Rendered {} of {} records onto {} slides in {} deck(s)",
            self.records_rendered,
            self.rows_read,
            self.slides_written,
            self.decks.len()
        );
        for (status, count) in &self.dropped_by_status {
            log::warn!(
                "Dropped {} record(s) with unrecognized status '{}'",
                count,
                status
            );
        }
        if self.unresolved_names > 0 {
            log::warn!("{} name(s) not found in the lookup table", self.unresolved_names);
        }
        if self.writes.missing_field > 0 {
            log::info!("{} mapped field(s) absent from records", self.writes.missing_field);
        }
        if self.writes.missing_slot > 0 {
            log::warn!("{} write(s) skipped: slot not on layout", self.writes.missing_slot);
        }
        if self.writes.type_mismatch > 0 {
            log::warn!(
                "{} write(s) fell back to 'Not Available': slot cannot hold text",
                self.writes.type_mismatch
            );
        }
    }
}
