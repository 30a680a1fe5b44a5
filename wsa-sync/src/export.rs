//! Snapshots of the current selection for download.

use csv::Writer;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use wsa_data::{Record, RecordSchema, RegionRegistry};

/// CSV of `metric` for the selected regions, one row per record.
///
/// Columns are `date,<region field>,<metric>`. Values are read the same way
/// as the series table, so decimal commas come out as dots and missing or
/// unparseable values as empty cells. With an empty selection every
/// record is exported.
pub fn selection_csv(
    records: &[Record],
    schema: &RecordSchema,
    metric: &str,
    selection: &BTreeSet<String>,
) -> anyhow::Result<String> {
    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(["date", schema.region_field.as_str(), metric])?;

    let mut rows = 0usize;
    for record in records {
        let region_id = record.region_id.as_deref().unwrap_or_default();
        if !selection.is_empty() && !selection.contains(region_id) {
            continue;
        }
        let value = record
            .metric_value(metric)
            .map(|v| v.to_string())
            .unwrap_or_default();
        writer.write_record([
            record.date.as_deref().unwrap_or_default(),
            region_id,
            value.as_str(),
        ])?;
        rows += 1;
    }
    log::info!("export: wrote {} CSV rows for metric '{}'", rows, metric);

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// FeatureCollection with the boundary features of the selected regions.
pub fn selection_geojson(
    registry: &RegionRegistry,
    selection: &BTreeSet<String>,
) -> anyhow::Result<Value> {
    if selection.is_empty() {
        anyhow::bail!("No regions selected");
    }
    let features: Vec<Value> = selection
        .iter()
        .filter_map(|id| registry.feature(id).cloned())
        .collect();
    if features.is_empty() {
        anyhow::bail!("None of the {} selected regions has a boundary", selection.len());
    }
    log::info!("export: {} of {} selected regions have boundaries", features.len(), selection.len());
    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}
