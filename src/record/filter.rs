//! Composable predicates over [`LogRecord`] date/time fields.

use chrono::{NaiveDate, NaiveTime};

use super::model::LogRecord;
use crate::error::{LogsiftError, Result};

/// A predicate over a single record. Implementations must be side-effect
/// free and safe to call from any worker thread.
pub trait RecordFilter: Send + Sync {
    fn matches(&self, record: &LogRecord) -> bool;
}

/// Rejects records without a timestamp; otherwise requires the record's
/// date to fall within `[from, to]` on whichever bounds are set.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeFilter {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRangeFilter {
    /// # Errors
    ///
    /// Returns [`LogsiftError::Configuration`] if both bounds are set and
    /// `from > to`.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(LogsiftError::Configuration(format!(
                    "date_from ({f}) must not be after date_to ({t})"
                )));
            }
        }
        Ok(Self { from, to })
    }
}

impl RecordFilter for DateRangeFilter {
    fn matches(&self, record: &LogRecord) -> bool {
        let Some(date) = record.date() else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Rejects records without a timestamp; otherwise requires the record's
/// time-of-day to fall within `[from, to]` on whichever bounds are set.
#[derive(Debug, Clone, Copy)]
pub struct TimeRangeFilter {
    from: Option<NaiveTime>,
    to: Option<NaiveTime>,
}

impl TimeRangeFilter {
    /// # Errors
    ///
    /// Returns [`LogsiftError::Configuration`] if both bounds are set and
    /// `from > to`.
    pub fn new(from: Option<NaiveTime>, to: Option<NaiveTime>) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(LogsiftError::Configuration(format!(
                    "time_from ({f}) must not be after time_to ({t})"
                )));
            }
        }
        Ok(Self { from, to })
    }
}

impl RecordFilter for TimeRangeFilter {
    fn matches(&self, record: &LogRecord) -> bool {
        let Some(time) = record.time() else {
            return false;
        };
        self.from.is_none_or(|from| time >= from) && self.to.is_none_or(|to| time <= to)
    }
}

/// ANDs together zero or more filters. With no filters, behaves as the
/// identity predicate (always true).
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl CompositeFilter {
    #[must_use]
    pub fn new(filters: Vec<Box<dyn RecordFilter>>) -> Self {
        Self { filters }
    }
}

impl RecordFilter for CompositeFilter {
    fn matches(&self, record: &LogRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record_at(date: &str, time: &str) -> LogRecord {
        let content = format!("{date} {time}.000+0000 INFO x");
        LogRecord {
            timestamp: chrono::DateTime::parse_from_str(
                &format!("{date} {time}.000+0000"),
                "%Y-%m-%d %H:%M:%S%.3f%z",
            )
            .ok(),
            content: content.clone(),
            first_line: content,
            source_file: PathBuf::from("test.log"),
            start_line: 1,
            end_line: 1,
            level: Some("INFO".to_string()),
            size_bytes: 0,
        }
    }

    fn record_without_timestamp() -> LogRecord {
        LogRecord {
            content: "no timestamp here".to_string(),
            first_line: "no timestamp here".to_string(),
            source_file: PathBuf::from("test.log"),
            start_line: 1,
            end_line: 1,
            timestamp: None,
            level: None,
            size_bytes: 0,
        }
    }

    #[test]
    fn empty_composite_is_identity() {
        let filter = CompositeFilter::default();
        assert!(filter.matches(&record_without_timestamp()));
        assert!(filter.matches(&record_at("2024-01-15", "10:00:00")));
    }

    #[test]
    fn date_range_rejects_missing_timestamp() {
        let filter = DateRangeFilter::new(None, None).unwrap();
        assert!(!filter.matches(&record_without_timestamp()));
    }

    #[test]
    fn date_range_respects_both_bounds() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let filter = DateRangeFilter::new(Some(from), Some(to)).unwrap();
        assert!(filter.matches(&record_at("2024-01-15", "10:00:00")));
        assert!(!filter.matches(&record_at("2024-01-01", "10:00:00")));
        assert!(!filter.matches(&record_at("2024-02-01", "10:00:00")));
    }

    #[test]
    fn invalid_date_range_rejected_at_construction() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRangeFilter::new(Some(from), Some(to)).is_err());
    }

    #[test]
    fn time_range_respects_both_bounds() {
        let from = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let to = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let filter = TimeRangeFilter::new(Some(from), Some(to)).unwrap();
        assert!(filter.matches(&record_at("2024-01-15", "12:00:00")));
        assert!(!filter.matches(&record_at("2024-01-15", "03:00:00")));
    }

    #[test]
    fn invalid_time_range_rejected_at_construction() {
        let from = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let to = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(TimeRangeFilter::new(Some(from), Some(to)).is_err());
    }

    #[test]
    fn composite_ands_multiple_filters() {
        let date_from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let date_to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let time_from = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let time_to = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        let filter = CompositeFilter::new(vec![
            Box::new(DateRangeFilter::new(Some(date_from), Some(date_to)).unwrap()),
            Box::new(TimeRangeFilter::new(Some(time_from), Some(time_to)).unwrap()),
        ]);

        assert!(filter.matches(&record_at("2024-06-01", "09:30:00")));
        assert!(!filter.matches(&record_at("2024-06-01", "14:00:00")));
    }
}
