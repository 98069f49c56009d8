//! Command-line surface: the filter's own flags, plus the ambient flags a
//! real CLI needs (`--config`, `--verbose`, `--quiet`).

use std::path::PathBuf;

use clap::Parser;

/// Filter large collections of timestamped log records by a boolean
/// expression, across plain and gzip-compressed files, in parallel.
#[derive(Parser, Debug)]
#[command(
    name = "logsift",
    author,
    version,
    about = "Parallel boolean-expression log filter for plain and gzip-compressed multi-line records.",
    long_about = "Scans a directory tree, reassembles multi-line log records, optionally filters by \
date/time, evaluates a boolean search expression against each record, and writes matches to a single \
output file."
)]
pub struct Cli {
    /// Load parameters from a YAML/JSON config file (CLI flags take priority).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Boolean search expression, e.g. "ERROR AND Kafka".
    #[arg(long, visible_alias = "expr")]
    pub expression: Option<String>,

    /// Root directory to search for log files.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Substring that file names must contain.
    #[arg(long = "file-name")]
    pub file_name: Option<String>,

    /// Glob patterns for files to include (e.g. "*.log").
    #[arg(long = "include", value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Glob patterns for files to exclude.
    #[arg(long = "exclude", value_delimiter = ',')]
    pub exclude_patterns: Vec<String>,

    /// Case-insensitive search.
    #[arg(long)]
    pub ignore_case: bool,

    /// Interpret search terms as regular expressions.
    #[arg(long)]
    pub regex: bool,

    /// Match whole words only (not substrings).
    #[arg(long)]
    pub word_boundary: bool,

    /// Strip quote characters before matching.
    #[arg(long)]
    pub strip_quotes: bool,

    /// Shortcut for `--word-boundary --strip-quotes`.
    #[arg(long)]
    pub exact_match: bool,

    /// Start date (YYYY-MM-DD, inclusive).
    #[arg(long = "from")]
    pub date_from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive).
    #[arg(long = "to")]
    pub date_to: Option<String>,

    /// Start time (HH:MM:SS, inclusive).
    #[arg(long = "from-time")]
    pub time_from: Option<String>,

    /// End time (HH:MM:SS, inclusive).
    #[arg(long = "to-time")]
    pub time_to: Option<String>,

    /// Output file path.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Do not include the source file path in output.
    #[arg(long)]
    pub no_path: bool,

    /// Highlight matches with <<< >>> markers.
    #[arg(long)]
    pub highlight: bool,

    /// Skip files larger than N megabytes.
    #[arg(long = "max-file-size", value_name = "MB")]
    pub max_file_size_mb: Option<u64>,

    /// Skip log records larger than N kilobytes.
    #[arg(long = "max-record-size", value_name = "KB")]
    pub max_record_size_kb: Option<u64>,

    /// Number of parallel worker threads (default: CPU cores, capped).
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Show the files that would be processed and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Show final processing statistics.
    #[arg(long)]
    pub stats: bool,

    /// Increase log verbosity (repeatable).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress messages.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}
