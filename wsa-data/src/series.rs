//! Per-region, per-date value lookup for a single metric.

use crate::numeric::parse_number;
use crate::record::Record;
use crate::temporal::{parse_date, TemporalIndex};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Values of one metric keyed by region, then by calendar date.
///
/// Missing or unparseable source values are absent from the table; an absent
/// entry is "no data" and distinct from a stored zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    metric: String,
    values: HashMap<String, BTreeMap<NaiveDate, f64>>,
    /// Region ids in first-encounter order, including regions with no values.
    regions: Vec<String>,
}

impl SeriesTable {
    /// Build the table for `metric` from records in ingestion order.
    ///
    /// Records without a region id or a parseable date are skipped. On a
    /// duplicate `(region, date)` pair the later record overwrites the earlier.
    pub fn build_index(records: &[Record], metric: &str) -> Self {
        let mut table = SeriesTable {
            metric: metric.to_string(),
            ..Default::default()
        };
        let mut skipped = 0usize;
        let mut missing = 0usize;

        for record in records {
            let Some(region_id) = record.region_id.as_deref() else {
                skipped += 1;
                continue;
            };
            let Some(date) = record.date.as_deref().and_then(|raw| parse_date(raw).ok()) else {
                skipped += 1;
                continue;
            };
            if !table.values.contains_key(region_id) {
                table.regions.push(region_id.to_string());
                table.values.insert(region_id.to_string(), BTreeMap::new());
            }
            match parse_number(record.metric(metric)) {
                Some(value) => {
                    if let Some(series) = table.values.get_mut(region_id) {
                        series.insert(date, value);
                    }
                }
                None => missing += 1,
            }
        }

        log::debug!(
            "series: indexed '{}' for {} regions, skipped {} malformed records, {} missing values",
            metric,
            table.regions.len(),
            skipped,
            missing
        );
        table
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Region ids in the order they first appeared in the records.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn value(&self, region_id: &str, date: &NaiveDate) -> Option<f64> {
        self.values.get(region_id)?.get(date).copied()
    }

    /// All stored values of one region in date order.
    pub fn series(&self, region_id: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.values.get(region_id)
    }

    /// Every present value at `date`, one per region, in region order.
    pub fn values_at(&self, date: &NaiveDate) -> Vec<f64> {
        self.regions
            .iter()
            .filter_map(|region_id| self.value(region_id, date))
            .collect()
    }

    /// A region's values aligned to the full date axis, `None` where absent.
    pub fn aligned(&self, region_id: &str, axis: &TemporalIndex) -> Vec<Option<f64>> {
        axis.dates()
            .iter()
            .map(|date| self.value(region_id, date))
            .collect()
    }

    /// Number of stored `(region, date)` values.
    pub fn len(&self) -> usize {
        self.values.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordSchema;

    fn record(region: Option<&str>, date: &str, value: Option<&str>) -> Record {
        let mut fields = vec![("date".to_string(), Some(date.to_string()))];
        if let Some(region) = region {
            fields.push(("WATERSHED_ID".to_string(), Some(region.to_string())));
        }
        fields.push(("Runoff".to_string(), value.map(str::to_string)));
        Record::from_fields(fields, &RecordSchema::default())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_comma_value_parsed() {
        let table = SeriesTable::build_index(&[record(Some("W1"), "01.01.2020", Some("12,5"))], "Runoff");
        assert_eq!(table.value("W1", &ymd(2020, 1, 1)), Some(12.5));
    }

    #[test]
    fn test_missing_values_absent() {
        let records = vec![
            record(Some("W1"), "01.01.2020", Some("")),
            record(Some("W1"), "01.02.2020", None),
            record(Some("W1"), "01.03.2020", Some("0")),
        ];
        let table = SeriesTable::build_index(&records, "Runoff");
        assert_eq!(table.value("W1", &ymd(2020, 1, 1)), None);
        assert_eq!(table.value("W1", &ymd(2020, 2, 1)), None);
        assert_eq!(table.value("W1", &ymd(2020, 3, 1)), Some(0.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_skips_records_without_region_or_date() {
        let records = vec![
            record(None, "01.01.2020", Some("1")),
            record(Some("W1"), "not a date", Some("2")),
        ];
        let table = SeriesTable::build_index(&records, "Runoff");
        assert!(table.is_empty());
        assert!(table.regions().is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let records = vec![
            record(Some("W1"), "01.01.2020", Some("1")),
            record(Some("W1"), "2020-01-01", Some("2")),
        ];
        let table = SeriesTable::build_index(&records, "Runoff");
        assert_eq!(table.value("W1", &ymd(2020, 1, 1)), Some(2.0));
    }

    #[test]
    fn test_round_trip_every_valid_value() {
        let records = vec![
            record(Some("W1"), "01.01.2020", Some("1,25")),
            record(Some("W2"), "01.01.2020", Some("-3")),
            record(Some("W2"), "01.02.2020", Some("7.5")),
            record(Some("W3"), "01.02.2020", Some("x")),
        ];
        let table = SeriesTable::build_index(&records, "Runoff");
        for r in &records {
            if let Some(expected) = r.metric_value("Runoff") {
                let date = parse_date(r.date.as_deref().unwrap()).unwrap();
                assert_eq!(table.value(r.region_id.as_deref().unwrap(), &date), Some(expected));
            }
        }
        assert_eq!(table.regions(), &["W1", "W2", "W3"]);
    }

    #[test]
    fn test_aligned_and_values_at() {
        let records = vec![
            record(Some("W1"), "01.01.2020", Some("1")),
            record(Some("W2"), "01.01.2020", Some("2")),
            record(Some("W2"), "01.02.2020", Some("3")),
        ];
        let axis = TemporalIndex::build_sorted_unique(["01.01.2020", "01.02.2020"]).unwrap();
        let table = SeriesTable::build_index(&records, "Runoff");
        assert_eq!(table.aligned("W1", &axis), vec![Some(1.0), None]);
        assert_eq!(table.aligned("W2", &axis), vec![Some(2.0), Some(3.0)]);
        assert_eq!(table.values_at(&ymd(2020, 1, 1)), vec![1.0, 2.0]);
        assert_eq!(table.values_at(&ymd(2020, 2, 1)), vec![3.0]);
    }
}
