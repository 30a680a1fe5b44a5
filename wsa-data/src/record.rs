use crate::numeric::parse_number;
use crate::DEFAULT_REGION_FIELD;
use serde::{Deserialize, Serialize};

/// Field names a tabular record source uses for its region and date columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSchema {
    /// Column holding the region identifier.
    pub region_field: String,
    /// Date columns in priority order; the first non-empty one wins.
    pub date_fields: Vec<String>,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            region_field: DEFAULT_REGION_FIELD.to_string(),
            date_fields: vec!["date".to_string(), "Date".to_string()],
        }
    }
}

/// A single observation row: one region, one date, any number of metric columns.
///
/// Metric values are kept as the raw strings of the source; `None` is a null
/// cell. Region and date are optional because malformed rows are still
/// ingested and skipped later where they cannot be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region_id: Option<String>,
    pub date: Option<String>,
    pub metrics: Vec<(String, Option<String>)>,
}

impl Record {
    /// Split a flat, ordered list of fields into region, date and metrics.
    pub fn from_fields(fields: Vec<(String, Option<String>)>, schema: &RecordSchema) -> Self {
        let mut region_id = None;
        let mut dates: Vec<(usize, String)> = Vec::new();
        let mut metrics = Vec::with_capacity(fields.len());

        for (name, value) in fields {
            if name == schema.region_field {
                region_id = non_empty(value);
            } else if let Some(priority) = schema.date_fields.iter().position(|f| *f == name) {
                if let Some(date) = non_empty(value) {
                    dates.push((priority, date));
                }
            } else {
                metrics.push((name, value));
            }
        }

        dates.sort_by_key(|(priority, _)| *priority);
        Record {
            region_id,
            date: dates.into_iter().next().map(|(_, date)| date),
            metrics,
        }
    }

    /// Raw value of a metric column, `None` when absent or null.
    pub fn metric(&self, name: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Parsed value of a metric column.
    pub fn metric_value(&self, name: &str) -> Option<f64> {
        parse_number(self.metric(name))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// True when a column name looks like an identifier or a date column.
///
/// The name is split into lower-cased alphanumeric tokens; any token equal to
/// `id`, `fid`, `objectid`, `date` or `time` excludes it.
pub fn is_identifier_or_date(name: &str) -> bool {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .map(str::to_ascii_lowercase)
        .any(|token| matches!(token.as_str(), "id" | "fid" | "objectid" | "date" | "time"))
}

/// Metric columns of a sample record whose values parse as numbers.
///
/// Only the sample is inspected, so a metric that first appears in later
/// records with a different layout is not discovered.
pub fn distinct_numeric_metrics(sample: &Record) -> Vec<String> {
    let mut metrics: Vec<String> = Vec::new();
    for (name, value) in &sample.metrics {
        if is_identifier_or_date(name) || metrics.contains(name) {
            continue;
        }
        if parse_number(value.as_deref()).is_some() {
            metrics.push(name.clone());
        }
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_from_fields_splits_keys() {
        let schema = RecordSchema::default();
        let record = Record::from_fields(
            fields(&[
                ("WATERSHED_ID", Some("W1")),
                ("date", Some("01.01.2020")),
                ("Precipitation", Some("12,5")),
                ("Runoff", None),
            ]),
            &schema,
        );
        assert_eq!(record.region_id.as_deref(), Some("W1"));
        assert_eq!(record.date.as_deref(), Some("01.01.2020"));
        assert_eq!(record.metrics.len(), 2);
        assert_eq!(record.metric("Precipitation"), Some("12,5"));
        assert_eq!(record.metric_value("Precipitation"), Some(12.5));
        assert_eq!(record.metric("Runoff"), None);
    }

    #[test]
    fn test_capitalized_date_fallback() {
        let schema = RecordSchema::default();
        let record = Record::from_fields(
            fields(&[("Date", Some("2020-05-01")), ("WATERSHED_ID", Some("W2"))]),
            &schema,
        );
        assert_eq!(record.date.as_deref(), Some("2020-05-01"));

        let both = Record::from_fields(
            fields(&[("Date", Some("2020-05-01")), ("date", Some("2020-06-01"))]),
            &schema,
        );
        assert_eq!(both.date.as_deref(), Some("2020-06-01"));
        assert_eq!(both.region_id, None);
    }

    #[test]
    fn test_blank_region_is_none() {
        let record = Record::from_fields(
            fields(&[("WATERSHED_ID", Some("  ")), ("date", Some("2020-01-01"))]),
            &RecordSchema::default(),
        );
        assert_eq!(record.region_id, None);
    }

    #[test]
    fn test_identifier_pattern() {
        assert!(is_identifier_or_date("BASIN_ID"));
        assert!(is_identifier_or_date("obs date"));
        assert!(is_identifier_or_date("OBJECTID"));
        assert!(!is_identifier_or_date("Humidity"));
        assert!(!is_identifier_or_date("Evapotranspiration"));
    }

    #[test]
    fn test_distinct_numeric_metrics_uses_sample_only() {
        let schema = RecordSchema::default();
        let sample = Record::from_fields(
            fields(&[
                ("WATERSHED_ID", Some("W1")),
                ("date", Some("01.01.2020")),
                ("Precipitation", Some("3,1")),
                ("Snow", Some("")),
                ("Runoff", Some("0")),
                ("SUB_ID", Some("7")),
                ("Name", Some("Ili")),
            ]),
            &schema,
        );
        assert_eq!(
            distinct_numeric_metrics(&sample),
            vec!["Precipitation".to_string(), "Runoff".to_string()]
        );
    }
}
