//! Record source parsing for JSON and CSV tables, optionally gzip-compressed.
//!
//! # Formats
//!
//! - **JSON**: an array of flat objects, e.g.
//!   `[{"WATERSHED_ID": "W1", "date": "01.01.2020", "Precipitation": "12,5"}]`.
//!   Strings, numbers and nulls are accepted as values; field order is kept.
//! - **CSV** (has headers): `WATERSHED_ID,date,Precipitation,...`; an empty
//!   cell reads as null.
//!
//! A `.gz` suffix on either form is decoded before parsing.

use crate::record::{Record, RecordSchema};
use crate::DataError;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;

/// Tabular layout of a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Detect the format from a path or URL, returning whether it is gzipped.
    pub fn from_location(location: &str) -> Result<(Self, bool), DataError> {
        let lower = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_ascii_lowercase();
        let (stem, gzipped) = match lower.strip_suffix(".gz") {
            Some(stem) => (stem.to_string(), true),
            None => (lower, false),
        };
        if stem.ends_with(".json") {
            Ok((SourceFormat::Json, gzipped))
        } else if stem.ends_with(".csv") {
            Ok((SourceFormat::Csv, gzipped))
        } else {
            Err(DataError::UnsupportedFormat {
                location: location.to_string(),
            })
        }
    }
}

/// Parse raw bytes fetched from `location` into records.
pub fn parse_records(
    bytes: &[u8],
    location: &str,
    schema: &RecordSchema,
) -> Result<Vec<Record>, DataError> {
    let (format, gzipped) = SourceFormat::from_location(location)?;
    let text = if gzipped {
        let mut decoder = GzDecoder::new(bytes);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        text
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };
    match format {
        SourceFormat::Json => records_from_json(&text, schema),
        SourceFormat::Csv => records_from_csv(&text, schema),
    }
}

/// Parse a JSON array of flat objects. Array items that are not objects are skipped.
pub fn records_from_json(json: &str, schema: &RecordSchema) -> Result<Vec<Record>, DataError> {
    let items: Vec<Value> = serde_json::from_str(json)?;
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0u32;

    for item in items {
        let Value::Object(object) = item else {
            skipped += 1;
            continue;
        };
        let fields = object
            .into_iter()
            .map(|(name, value)| (name, json_text(value)))
            .collect();
        records.push(Record::from_fields(fields, schema));
    }

    log::info!(
        "loader: Loaded {} JSON records, skipped {} non-object items",
        records.len(),
        skipped
    );
    Ok(records)
}

/// Parse a CSV table with a header row.
pub fn records_from_csv(csv_data: &str, schema: &RecordSchema) -> Result<Vec<Record>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row
                    .get(i)
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string);
                (name.trim().to_string(), value)
            })
            .collect();
        records.push(Record::from_fields(fields, schema));
    }

    log::info!("loader: Loaded {} CSV records", records.len());
    Ok(records)
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const JSON_DATA: &str = r#"[
  {"WATERSHED_ID": "W1", "date": "01.01.2020", "Precipitation": "12,5", "Runoff": 3},
  {"WATERSHED_ID": "W2", "Date": "2020-01-01", "Precipitation": null, "Runoff": "4.5"},
  "garbage"
]"#;

    const CSV_DATA: &str = "\
WATERSHED_ID,date,Precipitation,Runoff
W1,01.01.2020,\"12,5\",3
W2,01.01.2020,,4.5
";

    #[test]
    fn test_json_records() {
        let records = records_from_json(JSON_DATA, &RecordSchema::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metric("Precipitation"), Some("12,5"));
        assert_eq!(records[0].metric("Runoff"), Some("3"));
        assert_eq!(records[1].date.as_deref(), Some("2020-01-01"));
        assert_eq!(records[1].metric("Precipitation"), None);
        let names: Vec<&str> = records[0].metrics.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Precipitation", "Runoff"]);
    }

    #[test]
    fn test_csv_records() {
        let records = records_from_csv(CSV_DATA, &RecordSchema::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region_id.as_deref(), Some("W1"));
        assert_eq!(records[0].metric_value("Precipitation"), Some(12.5));
        assert_eq!(records[1].metric("Precipitation"), None);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SourceFormat::from_location("data/monthly.json").unwrap(),
            (SourceFormat::Json, false)
        );
        assert_eq!(
            SourceFormat::from_location("https://host/x.CSV.gz?v=2").unwrap(),
            (SourceFormat::Csv, true)
        );
        assert!(matches!(
            SourceFormat::from_location("data.xlsx"),
            Err(DataError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_gzipped_json() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(JSON_DATA.as_bytes()).unwrap();
        let bytes = encoder.finish().unwrap();
        let records = parse_records(&bytes, "monthly.json.gz", &RecordSchema::default()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_not_an_array() {
        let result = records_from_json(r#"{"a": 1}"#, &RecordSchema::default());
        assert!(matches!(result, Err(DataError::Json(_))));
    }
}
