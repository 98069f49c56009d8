//! Wires the expression engine, scanner, and workers into one run: parse the
//! expression once, scan the tree, fan out across a thread pool, fold
//! results into [`ProcessingStats`], and write matches in one batch.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::config::{AppConfig, platform_max_workers};
use crate::error::{LogsiftError, Result};
use crate::expression::{PatternTable, parse};
use crate::io::{FileMetadata, FileScanner, ScanSummary};
use crate::record::{CompositeFilter, DateRangeFilter, RecordFilter, TimeRangeFilter};
use crate::stats::ProcessingStats;
use crate::writer::OutputWriter;

use super::worker::{PerFileResult, WorkerContext, process_one_file};

/// What a completed (or dry-run) invocation produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub stats: ProcessingStats,
    pub dry_run_summary: Option<ScanSummary>,
}

/// Runs one end-to-end filtering pass over a validated configuration.
#[derive(Debug)]
pub struct Orchestrator {
    config: AppConfig,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`LogsiftError::Parse`]/[`LogsiftError::Tokenization`] if the
    /// search expression is malformed, [`LogsiftError::Configuration`] if
    /// the file-discovery configuration is invalid, [`LogsiftError::Interrupted`]
    /// if `interrupted` is observed set between phases, and
    /// [`LogsiftError::FileHandling`] if the output file cannot be written.
    pub fn run(&self, interrupted: &AtomicBool) -> Result<RunOutcome> {
        let ast = parse(&self.config.search.expression)?;
        let patterns = PatternTable::build(&ast, self.config.search.match_config);
        if !patterns.is_usable() {
            log::warn!(
                "every pattern in '{}' failed to compile; no record will ever match",
                self.config.search.expression
            );
        }

        let filter = self.build_filter()?;

        let scanner = FileScanner::new(
            self.config.files.path.clone(),
            self.config.files.extensions.clone(),
            self.config.files.file_masks.clone(),
            &self.config.files.include_patterns,
            &self.config.files.exclude_patterns,
            self.config.files.max_file_size_bytes,
            true,
        )?;

        if self.config.output.dry_run {
            let summary = scanner.count_files();
            log::info!(
                "dry run: {} file(s) eligible, {} skipped out of {} scanned",
                summary.eligible,
                summary.skipped,
                summary.total
            );
            return Ok(RunOutcome {
                stats: ProcessingStats::default(),
                dry_run_summary: Some(summary),
            });
        }

        check_interrupted(interrupted)?;

        let mut stats = ProcessingStats::default();
        stats.start();

        let files = scanner.scan();
        stats.record_scanned(&files);

        let (eligible, skipped): (Vec<FileMetadata>, Vec<FileMetadata>) =
            files.into_iter().partition(|f| !f.should_skip());
        for file in &skipped {
            stats.merge(&skip_result(file));
        }

        check_interrupted(interrupted)?;

        let worker_count = self
            .config
            .processing
            .worker_count
            .unwrap_or_else(|| num_cpus::get().min(platform_max_workers()));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .build()
            .map_err(|e| LogsiftError::Unexpected(format!("cannot start worker pool: {e}")))?;

        let ctx = WorkerContext {
            ast: &ast,
            patterns: &patterns,
            match_config: self.config.search.match_config,
            filter: &filter,
            max_record_size_bytes: self.config.files.max_record_size_bytes,
            include_path: self.config.output.include_file_path,
            highlight_matches: self.config.output.highlight_matches,
        };

        // Each task checks the flag for itself right before doing real work,
        // so a task that hasn't started yet when SIGINT lands skips its file
        // entirely; a task already running finishes normally. If the flag
        // ends up set, every result collected here (finished or skipped) is
        // discarded below in favor of an `Interrupted` outcome.
        let results: Vec<Option<PerFileResult>> = pool.install(|| {
            eligible
                .par_iter()
                .map(|file| {
                    if interrupted.load(Ordering::SeqCst) {
                        None
                    } else {
                        Some(process_one_file(file, &ctx))
                    }
                })
                .collect()
        });

        check_interrupted(interrupted)?;

        let results: Vec<PerFileResult> = results.into_iter().flatten().collect();
        let mut matched_records = Vec::new();
        for result in &results {
            stats.merge(result);
            matched_records.extend(result.matched_records.iter().cloned());
        }

        OutputWriter::write_all(&self.config.output.output_file, &matched_records)?;
        stats.stop();

        log::info!(
            "processed {} file(s), matched {} record(s) in {:.2}s",
            stats.files_processed,
            stats.records_matched,
            stats.duration().as_secs_f64()
        );

        Ok(RunOutcome { stats, dry_run_summary: None })
    }

    fn build_filter(&self) -> Result<CompositeFilter> {
        let mut filters: Vec<Box<dyn RecordFilter>> = Vec::new();
        let search = &self.config.search;

        if search.date_from.is_some() || search.date_to.is_some() {
            filters.push(Box::new(DateRangeFilter::new(search.date_from, search.date_to)?));
        }
        if search.time_from.is_some() || search.time_to.is_some() {
            filters.push(Box::new(TimeRangeFilter::new(search.time_from, search.time_to)?));
        }

        Ok(CompositeFilter::new(filters))
    }
}

fn skip_result(file: &FileMetadata) -> PerFileResult {
    PerFileResult {
        path: file.path.clone(),
        error: file.skip_reason.clone(),
        ..Default::default()
    }
}

fn check_interrupted(interrupted: &AtomicBool) -> Result<()> {
    if interrupted.load(Ordering::SeqCst) {
        return Err(LogsiftError::Interrupted);
    }
    Ok(())
}
