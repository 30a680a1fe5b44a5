//! Read-only views of a dataset: metric discovery and classification.

use anyhow::Context;
use log::info;
use serde_json::json;
use wsa_data::temporal::parse_date;
use wsa_data::DataError;
use wsa_sync::session::{load_dataset, SourceFetcher};
use wsa_sync::{Effect, ViewConfig, ViewEvent, ViewSyncController};
use wsa_utils::dates::format_iso;

/// Load `location` into a fresh controller, the same way a session would.
pub async fn open_dataset(
    config: &ViewConfig,
    fetcher: &dyn SourceFetcher,
    location: &str,
) -> anyhow::Result<ViewSyncController> {
    let mut controller = ViewSyncController::new(config.clone());
    let ticket = controller
        .handle(ViewEvent::DatasetRequested(location.to_string()))
        .effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::FetchDataset(ticket) => Some(ticket),
            _ => None,
        })
        .context("Dataset request was not issued")?;

    let dataset = load_dataset(fetcher, location.to_string(), &config.schema, config.date_policy)
        .await
        .with_context(|| format!("Failed to load dataset {}", location))?;
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset {
            location: location.to_string(),
        }
        .into());
    }
    controller.handle(ViewEvent::DatasetLoaded {
        ticket,
        result: Ok(dataset),
    });
    Ok(controller)
}

/// Select `metric` on a loaded controller, failing on unknown names.
pub fn select_metric(controller: &mut ViewSyncController, metric: &str) -> anyhow::Result<()> {
    if !controller.metrics().iter().any(|m| m == metric) {
        anyhow::bail!(
            "Unknown metric '{}'; available: {}",
            metric,
            controller.metrics().join(", ")
        );
    }
    controller.handle(ViewEvent::MetricSelected(metric.to_string()));
    Ok(())
}

/// Summary of the metrics and date range of a dataset.
pub fn metrics_report(controller: &ViewSyncController) -> serde_json::Value {
    let dataset = controller.dataset();
    let temporal = dataset.temporal();
    let last = temporal.last_index().unwrap_or_default();
    json!({
        "metrics": controller.metrics(),
        "dates": temporal.len(),
        "first_date": temporal.label(0),
        "last_date": temporal.label(last),
        "iso_range": [
            temporal.get(0).map(|d| format_iso(&d)),
            temporal.get(last).map(|d| format_iso(&d)),
        ],
        "records": dataset.records().len(),
        "dropped": dataset.dropped(),
    })
}

pub async fn run_metrics(
    config: &ViewConfig,
    fetcher: &dyn SourceFetcher,
    dataset: &str,
) -> anyhow::Result<()> {
    let controller = open_dataset(config, fetcher, dataset).await?;
    info!("Discovered {} metrics in {}", controller.metrics().len(), dataset);
    println!("{}", serde_json::to_string_pretty(&metrics_report(&controller))?);
    Ok(())
}

/// Classification of one metric at one date, as JSON.
pub fn classify_report(
    controller: &mut ViewSyncController,
    metric: Option<&str>,
    date: Option<&str>,
) -> anyhow::Result<serde_json::Value> {
    if let Some(metric) = metric {
        select_metric(controller, metric)?;
    }
    let cursor = match date {
        Some(raw) => {
            let date = parse_date(raw)?;
            controller
                .dataset()
                .temporal()
                .position(&date)
                .with_context(|| format!("Date {} is not in the dataset", raw))?
        }
        None => 0,
    };
    let instruction = controller
        .handle(ViewEvent::CursorMoved(cursor))
        .render
        .context("Dataset has no dates")?;

    Ok(json!({
        "metric": controller.state().metric,
        "date": instruction.map.date_label,
        "breaks": instruction.map.breaks,
        "legend": instruction.legend,
        "regions": instruction.map.regions,
    }))
}

pub async fn run_classify(
    config: &ViewConfig,
    fetcher: &dyn SourceFetcher,
    dataset: &str,
    metric: Option<&str>,
    date: Option<&str>,
) -> anyhow::Result<()> {
    let mut controller = open_dataset(config, fetcher, dataset).await?;
    let report = classify_report(&mut controller, metric, date)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
