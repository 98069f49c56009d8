//! Validated application configuration, built from CLI flags merged with an
//! optional YAML/JSON config file (CLI flags win on conflict).

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{LogsiftError, Result};
use crate::expression::MatchConfig;

/// Conservative worker-count cap for Linux and macOS.
pub const MAX_WORKERS_UNIX: usize = 32;
/// Matches the historical `ProcessPoolExecutor` limit on Windows.
pub const MAX_WORKERS_WINDOWS: usize = 61;
/// Fallback cap for platforms the other two constants don't name.
pub const MAX_WORKERS_DEFAULT: usize = 32;

#[must_use]
pub const fn platform_max_workers() -> usize {
    if cfg!(windows) {
        MAX_WORKERS_WINDOWS
    } else if cfg!(unix) {
        MAX_WORKERS_UNIX
    } else {
        MAX_WORKERS_DEFAULT
    }
}

/// Search expression and matching-mode configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub expression: String,
    pub match_config: MatchConfig,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if self.expression.trim().is_empty() {
            return Err(LogsiftError::Configuration(
                "search expression cannot be empty".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(LogsiftError::Configuration(format!(
                    "date_from ({from}) must be <= date_to ({to})"
                )));
            }
        }
        if let (Some(from), Some(to)) = (self.time_from, self.time_to) {
            if from > to {
                return Err(LogsiftError::Configuration(format!(
                    "time_from ({from}) must be <= time_to ({to})"
                )));
            }
        }
        Ok(())
    }
}

/// File-discovery configuration.
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub path: PathBuf,
    pub file_masks: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_file_size_bytes: Option<u64>,
    pub max_record_size_bytes: Option<u64>,
    pub extensions: Vec<String>,
}

impl FileConfig {
    fn validate(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(LogsiftError::Configuration(format!(
                "path does not exist: {}",
                self.path.display()
            )));
        }
        if !self.path.is_dir() {
            return Err(LogsiftError::Configuration(format!(
                "path is not a directory: {}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

/// Output-writing configuration.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub output_file: PathBuf,
    pub include_file_path: bool,
    pub highlight_matches: bool,
    pub show_stats: bool,
    pub dry_run: bool,
}

/// Worker-pool and logging configuration.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub worker_count: Option<usize>,
    pub quiet: bool,
    pub verbosity: u8,
}

impl ProcessingConfig {
    fn validate(&self) -> Result<()> {
        let Some(count) = self.worker_count else {
            return Ok(());
        };
        if count == 0 {
            return Err(LogsiftError::Configuration(
                "worker count must be positive".to_string(),
            ));
        }
        let cap = platform_max_workers();
        if count > cap {
            return Err(LogsiftError::Configuration(format!(
                "worker count ({count}) exceeds platform maximum ({cap})"
            )));
        }
        let cpu_count = num_cpus::get();
        if count > cpu_count.saturating_mul(4) {
            log::warn!(
                "worker count ({count}) is more than 4x the detected CPU count ({cpu_count}); \
                 proceeding, but this rarely helps"
            );
        }
        Ok(())
    }
}

/// Complete, validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub files: FileConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

/// Mirror of the CLI flags, all optional, loaded from a YAML/JSON file and
/// used only to fill in values the user didn't pass on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ConfigFile {
    expression: Option<String>,
    path: Option<PathBuf>,
    file_name: Option<String>,
    include_patterns: Option<Vec<String>>,
    exclude_patterns: Option<Vec<String>>,
    ignore_case: Option<bool>,
    regex: Option<bool>,
    word_boundary: Option<bool>,
    strip_quotes: Option<bool>,
    exact_match: Option<bool>,
    date_from: Option<String>,
    date_to: Option<String>,
    time_from: Option<String>,
    time_to: Option<String>,
    output: Option<PathBuf>,
    no_path: Option<bool>,
    highlight: Option<bool>,
    max_file_size_mb: Option<u64>,
    max_record_size_kb: Option<u64>,
    workers: Option<usize>,
    dry_run: Option<bool>,
    stats: Option<bool>,
    extensions: Option<Vec<String>>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LogsiftError::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            LogsiftError::Configuration(format!("cannot read config file {}: {e}", path.display()))
        })?;

        let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "json");
        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| LogsiftError::Configuration(format!("invalid JSON in config file: {e}")))
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| LogsiftError::Configuration(format!("invalid YAML in config file: {e}")))
        }
    }
}

impl AppConfig {
    /// Builds and validates an [`AppConfig`] from parsed CLI flags, merging
    /// in an optional config file for any value the user left unset on the
    /// command line.
    ///
    /// # Errors
    ///
    /// Returns [`LogsiftError::Configuration`] if the config file can't be
    /// loaded/parsed, a date/time value is malformed, the search expression
    /// is empty, the path doesn't exist, or the worker count is invalid.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let expression = cli
            .expression
            .or(file.expression)
            .ok_or_else(|| LogsiftError::Configuration("--expression is required".to_string()))?;

        let word_boundary = cli.word_boundary || cli.exact_match || file.exact_match.unwrap_or(false);
        let strip_quotes = cli.strip_quotes || cli.exact_match || file.exact_match.unwrap_or(false);

        let date_from = parse_date(cli.date_from.or(file.date_from))?;
        let date_to = parse_date(cli.date_to.or(file.date_to))?;
        let time_from = parse_time(cli.time_from.or(file.time_from))?;
        let time_to = parse_time(cli.time_to.or(file.time_to))?;

        let search = SearchConfig {
            expression,
            match_config: MatchConfig {
                ignore_case: cli.ignore_case || file.ignore_case.unwrap_or(false),
                use_regex: cli.regex || file.regex.unwrap_or(false),
                word_boundary: word_boundary || file.word_boundary.unwrap_or(false),
                strip_quotes: strip_quotes || file.strip_quotes.unwrap_or(false),
            },
            date_from,
            date_to,
            time_from,
            time_to,
        };
        search.validate()?;

        let path = if cli.path == Path::new(".") {
            file.path.unwrap_or(cli.path)
        } else {
            cli.path
        };

        let mut file_masks = Vec::new();
        if let Some(name) = cli.file_name.or(file.file_name) {
            file_masks.push(name);
        }

        let include_patterns = if cli.include_patterns.is_empty() {
            file.include_patterns.unwrap_or_default()
        } else {
            cli.include_patterns
        };
        let exclude_patterns = if cli.exclude_patterns.is_empty() {
            file.exclude_patterns.unwrap_or_default()
        } else {
            cli.exclude_patterns
        };
        let extensions = file.extensions.unwrap_or_else(|| vec!["log".to_string(), "gz".to_string()]);

        let files = FileConfig {
            path,
            file_masks,
            include_patterns,
            exclude_patterns,
            max_file_size_bytes: cli
                .max_file_size_mb
                .or(file.max_file_size_mb)
                .map(|mb| mb * 1024 * 1024),
            max_record_size_bytes: cli
                .max_record_size_kb
                .or(file.max_record_size_kb)
                .map(|kb| kb * 1024),
            extensions,
        };
        files.validate()?;

        let output = OutputConfig {
            output_file: cli
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from("filter-result.log")),
            include_file_path: !(cli.no_path || file.no_path.unwrap_or(false)),
            highlight_matches: cli.highlight || file.highlight.unwrap_or(false),
            show_stats: cli.stats || file.stats.unwrap_or(false),
            dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
        };

        let processing = ProcessingConfig {
            worker_count: cli.workers.or(file.workers),
            quiet: cli.quiet,
            verbosity: cli.verbose,
        };
        processing.validate()?;

        Ok(Self { search, files, output, processing })
    }
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    let Some(value) = value else { return Ok(None) };
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| LogsiftError::Configuration(format!("invalid date '{value}': {e}")))
}

fn parse_time(value: Option<String>) -> Result<Option<NaiveTime>> {
    let Some(value) = value else { return Ok(None) };
    NaiveTime::parse_from_str(&value, "%H:%M:%S")
        .map(Some)
        .map_err(|e| LogsiftError::Configuration(format!("invalid time '{value}': {e}")))
}
