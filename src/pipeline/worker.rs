//! Per-file worker: Assembler → Filter → Evaluator, run independently for
//! one file. Workers never write to the output file and never share
//! mutable state, they return a [`PerFileResult`] for the orchestrator to
//! fold in.

use std::path::PathBuf;

use crate::error::LogsiftError;
use crate::expression::{AstNode, Evaluator, MatchConfig, PatternTable};
use crate::highlight;
use crate::io::{FileHandler, FileMetadata, GzipFileHandler, PlainFileHandler};
use crate::record::{CompositeFilter, RecordAssembler, RecordFilter};
use crate::writer::OutputWriter;

/// One file's processing outcome, sent back to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct PerFileResult {
    pub path: PathBuf,
    pub match_count: usize,
    pub records_total: u64,
    pub records_skipped: u64,
    pub bytes_processed: u64,
    pub lines_processed: u64,
    pub matched_records: Vec<String>,
    /// Set when the file was skipped or aborted partway through; `None`
    /// means it was processed to completion without error.
    pub error: Option<String>,
}

/// Parameters threaded into every worker task, shared read-only across the
/// whole run.
pub struct WorkerContext<'a> {
    pub ast: &'a AstNode,
    pub patterns: &'a PatternTable,
    pub match_config: MatchConfig,
    pub filter: &'a CompositeFilter,
    pub max_record_size_bytes: Option<u64>,
    pub include_path: bool,
    pub highlight_matches: bool,
}

/// Processes a single file end to end. Never panics on a per-file error;
/// every failure mode becomes `PerFileResult.error` instead.
#[must_use]
pub fn process_one_file(file: &FileMetadata, ctx: &WorkerContext<'_>) -> PerFileResult {
    let mut result = PerFileResult {
        path: file.path.clone(),
        ..Default::default()
    };

    let handler: Box<dyn FileHandler> = if file.compressed {
        Box::new(GzipFileHandler::new(&file.path))
    } else {
        Box::new(PlainFileHandler::new(&file.path))
    };

    match handler.validate() {
        Ok(Some(reason)) => {
            result.error = Some(reason);
            return result;
        }
        Ok(None) => {}
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    }

    let lines = match handler.read_lines() {
        Ok(lines) => lines,
        Err(e) => {
            result.error = Some(describe_open_failure(&e));
            return result;
        }
    };

    let assembler = RecordAssembler::new(lines, file.path.clone(), ctx.max_record_size_bytes);
    let evaluator = Evaluator::new(ctx.match_config, Some(ctx.patterns));
    let patterns_for_highlight = if ctx.highlight_matches { ctx.ast.patterns() } else { Vec::new() };

    for outcome in assembler {
        match outcome {
            Ok(record) => {
                result.records_total += 1;
                #[allow(clippy::cast_possible_truncation)]
                {
                    result.bytes_processed += record.size_bytes as u64;
                }
                result.lines_processed += (record.end_line - record.start_line + 1) as u64;

                if !ctx.filter.matches(&record) {
                    result.records_skipped += 1;
                    continue;
                }

                if evaluator.evaluate(ctx.ast, &record.content) {
                    result.match_count += 1;
                    let content = if ctx.highlight_matches && !patterns_for_highlight.is_empty() {
                        highlight::highlight(
                            &record.content,
                            &patterns_for_highlight,
                            ctx.match_config.ignore_case,
                            ctx.match_config.use_regex,
                        )
                    } else {
                        record.content.clone()
                    };
                    result
                        .matched_records
                        .push(OutputWriter::format_record(&content, &file.path, ctx.include_path));
                }
            }
            Err(LogsiftError::RecordSizeExceeded { size_kb, max_size_kb }) => {
                result.error = Some(format!(
                    "record-size-exceeded: {size_kb:.2}KB exceeds {max_size_kb}KB limit"
                ));
                break;
            }
            Err(e) => {
                result.error = Some(describe_stream_failure(&e));
                break;
            }
        }
    }

    result
}

fn describe_open_failure(err: &LogsiftError) -> String {
    match err {
        LogsiftError::FileHandling { message, .. } if message.contains("decode") => {
            "decode-error".to_string()
        }
        LogsiftError::FileHandling { message, .. } if message.contains("gzip") => {
            format!("gzip-error: {message}")
        }
        other => other.to_string(),
    }
}

fn describe_stream_failure(err: &LogsiftError) -> String {
    format!("unexpected-error: {err}")
}
