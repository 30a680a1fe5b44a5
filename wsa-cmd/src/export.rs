//! Selection snapshots written to disk.

use crate::inspect::{open_dataset, select_metric};
use log::info;
use std::collections::BTreeSet;
use wsa_sync::export::selection_geojson;
use wsa_sync::session::{load_registry, SourceFetcher};
use wsa_sync::{ViewConfig, ViewEvent, ViewSyncController};

/// Toggle each region once so the controller's selection matches `regions`.
pub fn select_regions(controller: &mut ViewSyncController, regions: &[String]) {
    let unique: BTreeSet<&String> = regions.iter().collect();
    for region in unique {
        controller.handle(ViewEvent::RegionClicked(region.clone()));
    }
}

fn write_output(out: Option<&str>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, contents)?;
            info!("Wrote {} bytes to {}", contents.len(), path);
        }
        None => print!("{}", contents),
    }
    Ok(())
}

pub async fn run_export_csv(
    config: &ViewConfig,
    fetcher: &dyn SourceFetcher,
    dataset: &str,
    metric: &str,
    regions: &[String],
    out: Option<&str>,
) -> anyhow::Result<()> {
    let mut controller = open_dataset(config, fetcher, dataset).await?;
    select_metric(&mut controller, metric)?;
    select_regions(&mut controller, regions);
    let csv = controller.export_csv()?;
    write_output(out, &csv)
}

pub async fn run_export_geojson(
    config: &ViewConfig,
    fetcher: &dyn SourceFetcher,
    boundaries: &str,
    regions: &[String],
    out: Option<&str>,
) -> anyhow::Result<()> {
    let registry = load_registry(
        fetcher,
        boundaries.to_string(),
        &config.schema.region_field,
        &config.name_field,
    )
    .await?;
    let selection: BTreeSet<String> = regions.iter().cloned().collect();
    let collection = selection_geojson(&registry, &selection)?;
    write_output(out, &serde_json::to_string_pretty(&collection)?)
}
