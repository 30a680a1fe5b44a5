//! Calendar parsing and the sorted, deduplicated date axis shared by every view.

use crate::{DataError, ISO_FORMAT};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a record whose date string cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Skip the record, log it and keep loading.
    #[default]
    DropRecord,
    /// Abort the whole load with [`DataError::DateFormat`].
    RejectLoad,
}

/// Parse a date in either `DD.MM.YYYY` or ISO 8601 form.
///
/// ISO input may be a bare date, a naive date-time (`2020-03-01T00:00:00`) or
/// an RFC 3339 timestamp; only the calendar date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DataError> {
    let trimmed = raw.trim();
    let format_error = || DataError::DateFormat {
        raw: raw.to_string(),
    };

    let parts: Vec<&str> = trimmed.split('.').collect();
    if let [day, month, year] = parts.as_slice() {
        if is_digits(day, 1, 2) && is_digits(month, 1, 2) && is_digits(year, 4, 4) {
            let day = day.parse::<u32>().map_err(|_| format_error())?;
            let month = month.parse::<u32>().map_err(|_| format_error())?;
            let year = year.parse::<i32>().map_err(|_| format_error())?;
            return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(format_error);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_FORMAT) {
        return Ok(date);
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(date_time.date());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|date_time| date_time.date_naive())
        .map_err(|_| format_error())
}

fn is_digits(part: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}

/// Strictly increasing sequence of observation dates.
///
/// Each date keeps the first raw string it was seen under as its display
/// label, so a dataset written in `DD.MM.YYYY` keeps showing that layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalIndex {
    dates: Vec<NaiveDate>,
    labels: Vec<String>,
}

impl TemporalIndex {
    /// Build the index, failing on the first unparseable date string.
    pub fn build_sorted_unique<'a, I>(raw_dates: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: BTreeMap<NaiveDate, &'a str> = BTreeMap::new();
        for raw in raw_dates {
            let date = parse_date(raw)?;
            seen.entry(date).or_insert(raw);
        }
        Ok(Self::from_map(seen))
    }

    fn from_map(seen: BTreeMap<NaiveDate, &str>) -> Self {
        let (dates, labels): (Vec<NaiveDate>, Vec<String>) = seen
            .into_iter()
            .map(|(date, raw)| (date, raw.trim().to_string()))
            .unzip();
        Self { dates, labels }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Position of a calendar date on the axis.
    pub fn position(&self, date: &NaiveDate) -> Option<usize> {
        self.dates.binary_search(date).ok()
    }

    /// Index of the last date, or `None` for an empty axis.
    pub fn last_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    /// Clamp a cursor into `[0, len - 1]`; an empty axis clamps to 0.
    pub fn clamp(&self, cursor: usize) -> usize {
        self.last_index().map_or(0, |last| cursor.min(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_dotted_and_iso() {
        assert_eq!(parse_date("01.03.2020").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01T12:30:00").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01T00:00:00Z").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01T00:00:00.000Z").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01T08:15:00.250").unwrap(), ymd(2020, 3, 1));
        assert_eq!(parse_date("1.3.2020").unwrap(), ymd(2020, 3, 1));
    }

    #[test]
    fn test_parse_rejects_short_or_signed_dotted_parts() {
        assert!(matches!(
            parse_date("01.03.20"),
            Err(DataError::DateFormat { raw }) if raw == "01.03.20"
        ));
        assert!(parse_date("+1.03.2020").is_err());
        assert!(parse_date("01.03.02020").is_err());
        assert!(parse_date("001.03.2020").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_date("2020/03/01"),
            Err(DataError::DateFormat { .. })
        ));
        assert!(parse_date("31.02.2020").is_err());
        assert!(parse_date("01.03").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_build_sorted_unique_dedups_mixed_formats() {
        let index =
            TemporalIndex::build_sorted_unique(["01.03.2020", "2020-03-01", "15.01.2020"]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dates(), &[ymd(2020, 1, 15), ymd(2020, 3, 1)]);
        assert_eq!(index.label(0), Some("15.01.2020"));
        assert_eq!(index.label(1), Some("01.03.2020"));
    }

    #[test]
    fn test_build_sorted_unique_fails_on_bad_date() {
        let result = TemporalIndex::build_sorted_unique(["01.01.2020", "someday"]);
        assert!(matches!(result, Err(DataError::DateFormat { raw }) if raw == "someday"));
    }

    #[test]
    fn test_clamp_and_position() {
        let index = TemporalIndex::build_sorted_unique(["2020-01-01", "2020-02-01"]).unwrap();
        assert_eq!(index.clamp(7), 1);
        assert_eq!(index.clamp(0), 0);
        assert_eq!(index.position(&ymd(2020, 2, 1)), Some(1));
        assert_eq!(index.position(&ymd(2020, 3, 1)), None);

        let empty = TemporalIndex::default();
        assert_eq!(empty.clamp(3), 0);
        assert_eq!(empty.last_index(), None);
    }
}
