//! The assembled log record type and its start-line recognition pattern.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Matches `YYYY-MM-DD HH:MM:SS.mmm±HHMM<whitespace><LEVEL>` at the start of
/// a line. Capturing groups: date, time, level.
pub static RECORD_START_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d{2}:\d{2}:\d{2})\.\d{3}[+-]\d{4}\s+([A-Z]+)").unwrap()
});

/// The three `strptime`-equivalent formats tried, in order, to parse a
/// record's timestamp: with milliseconds and offset, with milliseconds and
/// no offset, and plain seconds.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.3f%z",
    "%Y-%m-%d %H:%M:%S%.3f",
    "%Y-%m-%d %H:%M:%S",
];

/// A fully assembled, immutable multi-line log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub content: String,
    pub first_line: String,
    pub source_file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub level: Option<String>,
    pub size_bytes: usize,
}

impl LogRecord {
    /// Builds a record from its buffered lines and the metadata stashed off
    /// the start line, if any matched.
    pub(super) fn new(
        lines: &[String],
        size_bytes: usize,
        stashed: Option<(&str, &str, &str)>,
        source_file: &Path,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        let content = lines.join("\n");
        let first_line = lines.first().cloned().unwrap_or_default();
        let (timestamp, level) = match stashed {
            Some((date_str, time_str, level)) => {
                (parse_timestamp(date_str, time_str), Some(level.to_string()))
            }
            None => (None, None),
        };

        Self {
            content,
            first_line,
            source_file: source_file.to_path_buf(),
            start_line,
            end_line,
            timestamp,
            level,
            size_bytes,
        }
    }

    /// The calendar date projection of `timestamp`, if set.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date_naive())
    }

    /// The time-of-day projection of `timestamp`, if set.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        self.timestamp.map(|ts| ts.time())
    }
}

fn parse_timestamp(date_str: &str, time_str: &str) -> Option<DateTime<FixedOffset>> {
    let combined = format!("{date_str} {time_str}");

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&combined, format) {
            return Some(parsed);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(&combined, format) {
            return naive.and_local_timezone(FixedOffset::east_opt(0)?).single();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_start_pattern_captures_date_time_level() {
        let caps = RECORD_START_PATTERN
            .captures("2024-01-15 10:30:00.123+0000 ERROR Something broke")
            .unwrap();
        assert_eq!(&caps[1], "2024-01-15");
        assert_eq!(&caps[2], "10:30:00");
        assert_eq!(&caps[3], "ERROR");
    }

    #[test]
    fn non_start_line_does_not_match() {
        assert!(!RECORD_START_PATTERN.is_match("    at com.example.Foo.bar(Foo.java:42)"));
    }

    #[test]
    fn timestamp_accepts_millis_and_offset_when_present() {
        let ts = parse_timestamp("2024-01-15", "10:30:00.123+0000");
        assert!(ts.is_some());
    }

    #[test]
    fn timestamp_falls_back_to_plain_seconds() {
        // The start pattern's `time` group captures only HH:MM:SS (millis and
        // offset are matched but not captured), so this is the format every
        // real record timestamp actually parses under.
        let ts = parse_timestamp("2024-01-15", "10:30:00");
        assert!(ts.is_some());
    }

    #[test]
    fn unparseable_timestamp_yields_none_not_error() {
        let ts = parse_timestamp("not-a-date", "whatever");
        assert!(ts.is_none());
    }
}
