//! Processing counters, merged once per run from per-worker results.
//!
//! No console/JSON/CSV/Markdown rendering lives here, this module only
//! accumulates the numbers; `main.rs` decides how to print them.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::io::FileMetadata;
use crate::pipeline::PerFileResult;

/// Run-wide counters, folded exactly once from each worker's [`PerFileResult`].
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub files_scanned: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub skip_reasons: BTreeMap<String, usize>,
    pub records_total: u64,
    pub records_matched: u64,
    pub records_skipped: u64,
    pub total_bytes_processed: u64,
    pub total_lines_processed: u64,
    start: Option<Instant>,
    end: Option<Instant>,
}

impl ProcessingStats {
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        self.end = Some(Instant::now());
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    /// Records that a file was scanned and eligible, before dispatch.
    pub fn record_scanned(&mut self, files: &[FileMetadata]) {
        self.files_scanned += files.len();
    }

    /// Folds one worker's result into the running totals. Called exactly
    /// once per file result, so there is no branch that can double-count
    /// a counter against another.
    pub fn merge(&mut self, result: &PerFileResult) {
        if let Some(reason) = &result.error {
            self.files_skipped += 1;
            *self.skip_reasons.entry(reason.clone()).or_insert(0) += 1;
        } else {
            self.files_processed += 1;
        }
        self.records_total += result.records_total;
        self.records_matched += result.match_count as u64;
        self.records_skipped += result.records_skipped;
        self.total_bytes_processed += result.bytes_processed;
        self.total_lines_processed += result.lines_processed;
    }

    #[must_use]
    pub fn records_per_second(&self) -> f64 {
        let seconds = self.duration().as_secs_f64();
        if seconds > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            return self.records_total as f64 / seconds;
        }
        0.0
    }
}
