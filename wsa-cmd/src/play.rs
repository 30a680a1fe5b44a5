//! Headless playback: a session whose collaborators write to the log.

use log::{debug, info};
use std::sync::Arc;
use wsa_sync::render::RegionFill;
use wsa_sync::session::SourceFetcher;
use wsa_sync::{
    ChartUpdate, ChartView, LayerMode, LegendEntry, LegendView, MapUpdate, MapView, Session,
    ViewConfig, ViewEvent,
};

/// Logs a one-line summary of every map update.
#[derive(Debug, Default)]
pub struct LogMap {
    pub updates: usize,
}

impl MapView for LogMap {
    fn update_map(&mut self, update: &MapUpdate) {
        self.updates += 1;
        let no_data = update
            .regions
            .iter()
            .filter(|r| r.fill == RegionFill::NoData)
            .count();
        let selected = update.regions.iter().filter(|r| r.selected).count();
        info!(
            "map: {} | {} regions, {} without data, {} selected | breaks [{}]",
            update.date_label.as_deref().unwrap_or("-"),
            update.regions.len(),
            no_data,
            selected,
            update.break_labels.join(", ")
        );
    }
}

#[derive(Debug, Default)]
pub struct LogChart {
    pub redraws: usize,
    pub highlights: Vec<usize>,
}

impl ChartView for LogChart {
    fn set_loading(&mut self, loading: bool) {
        debug!("chart: loading {}", loading);
    }

    fn update_chart(&mut self, update: &ChartUpdate) {
        match update {
            ChartUpdate::Redraw(set) => {
                self.redraws += 1;
                info!("chart: {} with {} series", set.title, set.series.len());
            }
            ChartUpdate::Highlight(index) => {
                self.highlights.push(*index);
                debug!("chart: highlight {}", index);
            }
            ChartUpdate::Clear => info!("chart: cleared"),
        }
    }
}

#[derive(Debug, Default)]
pub struct LogLegend;

impl LegendView for LogLegend {
    fn update_legend(&mut self, entries: &[LegendEntry]) {
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        debug!("legend: {}", labels.join(" | "));
    }
}

pub type LogSession = Session<LogMap, LogChart, LogLegend>;

/// Load a dataset and play it from the first date until playback stops.
pub async fn play(
    config: ViewConfig,
    fetcher: Arc<dyn SourceFetcher>,
    dataset: &str,
    boundaries: Option<&str>,
    metric: Option<&str>,
) -> anyhow::Result<LogSession> {
    let mut session = Session::new(
        config,
        fetcher,
        LogMap::default(),
        LogChart::default(),
        LogLegend,
    );
    if let Some(boundaries) = boundaries {
        session = session.with_boundaries(LayerMode::Watersheds, boundaries);
        session.load_boundaries();
    }

    session
        .handle(ViewEvent::DatasetRequested(dataset.to_string()))
        .await;
    session.run_until(|c| c.pending().is_none()).await;
    if session.controller().dataset().is_empty() {
        anyhow::bail!("Dataset {} could not be loaded", dataset);
    }

    if let Some(metric) = metric {
        if !session.controller().metrics().iter().any(|m| m == metric) {
            anyhow::bail!("Unknown metric '{}'", metric);
        }
        session
            .handle(ViewEvent::MetricSelected(metric.to_string()))
            .await;
    }

    session.handle(ViewEvent::PlayToggled).await;
    if !session.controller().state().is_playing {
        info!("Nothing to play: dataset has a single date");
        return Ok(session);
    }
    session.run_until(|c| !c.state().is_playing).await;
    info!(
        "Playback finished at {}",
        session
            .controller()
            .dataset()
            .temporal()
            .label(session.controller().state().cursor)
            .unwrap_or("-")
    );
    Ok(session)
}

pub async fn run_play(
    config: ViewConfig,
    fetcher: Arc<dyn SourceFetcher>,
    dataset: &str,
    boundaries: Option<&str>,
    metric: Option<&str>,
) -> anyhow::Result<()> {
    play(config, fetcher, dataset, boundaries, metric).await?;
    Ok(())
}
