//! The view state machine.
//!
//! Every external event goes through [`ViewSyncController::handle`], which
//! updates the state, re-derives classification and chart series, and returns
//! a [`Transition`]: the render instruction to publish plus the side effects
//! (fetches, timer changes) the session must carry out. The controller itself
//! does no I/O.

use crate::chart::{build_series_set, SeriesColors, SeriesRequest};
use crate::config::ViewConfig;
use crate::export;
use crate::render::{ChartUpdate, MapUpdate, RegionFill, RegionStyle, RenderInstruction};
use crate::state::{LayerMode, ViewState};
use std::collections::HashSet;
use wsa_classify::legend::{class_color, legend_entries};
use wsa_classify::{classify, ClassBreaks};
use wsa_data::{Dataset, RegionRegistry, SeriesTable};
use wsa_utils::numbers::{format_break, format_value};

/// Identifies one dataset request. Only the ticket of the latest request is
/// accepted when its load completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
    dataset_id: String,
}

impl LoadTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }
}

/// A discrete, fully-formed external event.
#[derive(Debug)]
pub enum ViewEvent {
    /// The user picked a dataset; the session starts fetching it.
    DatasetRequested(String),
    /// A dataset fetch finished, successfully or not.
    DatasetLoaded {
        ticket: LoadTicket,
        result: anyhow::Result<Dataset>,
    },
    /// A boundary layer's name registry finished loading.
    RegistryLoaded {
        layer: LayerMode,
        registry: RegionRegistry,
    },
    MetricSelected(String),
    CursorMoved(usize),
    PlayToggled,
    /// Playback timer tick, tagged with the playback run it belongs to.
    Tick { generation: u64 },
    RegionClicked(String),
    SelectionCleared,
    LayerModeChanged(LayerMode),
}

/// Work the session performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchDataset(LoadTicket),
    FetchRegistry(LayerMode),
    StartPlayback { generation: u64 },
    StopPlayback,
}

/// Result of handling one event.
#[derive(Debug, Default)]
pub struct Transition {
    pub render: Option<RenderInstruction>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn none() -> Self {
        Self::default()
    }

    fn render(instruction: RenderInstruction) -> Self {
        Self {
            render: Some(instruction),
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// How much of the chart a transition invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartChange {
    Redraw,
    Highlight,
}

/// Sole writer of the view state and everything derived from it.
#[derive(Debug)]
pub struct ViewSyncController {
    config: ViewConfig,
    state: ViewState,
    dataset: Dataset,
    metrics: Vec<String>,
    series: SeriesTable,
    registry: RegionRegistry,
    colors: SeriesColors,
    epoch: u64,
    pending: Option<LoadTicket>,
    play_generation: u64,
}

impl ViewSyncController {
    pub fn new(config: ViewConfig) -> Self {
        let colors = SeriesColors::new(config.series_palette.clone());
        Self {
            config,
            state: ViewState::default(),
            dataset: Dataset::default(),
            metrics: Vec::new(),
            series: SeriesTable::default(),
            registry: RegionRegistry::default(),
            colors,
            epoch: 0,
            pending: None,
            play_generation: 0,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Metrics offered for selection, discovered from the first record.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn series(&self) -> &SeriesTable {
        &self.series
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// The dataset request still awaiting its load, if any.
    pub fn pending(&self) -> Option<&LoadTicket> {
        self.pending.as_ref()
    }

    pub fn handle(&mut self, event: ViewEvent) -> Transition {
        match event {
            ViewEvent::DatasetRequested(dataset_id) => self.request_dataset(dataset_id),
            ViewEvent::DatasetLoaded { ticket, result } => self.apply_dataset(ticket, result),
            ViewEvent::RegistryLoaded { layer, registry } => self.apply_registry(layer, registry),
            ViewEvent::MetricSelected(metric) => self.select_metric(metric),
            ViewEvent::CursorMoved(cursor) => self.move_cursor(cursor),
            ViewEvent::PlayToggled => self.toggle_play(),
            ViewEvent::Tick { generation } => self.tick(generation),
            ViewEvent::RegionClicked(region_id) => self.toggle_region(&region_id),
            ViewEvent::SelectionCleared => self.clear_selection(),
            ViewEvent::LayerModeChanged(layer) => self.switch_layer(layer),
        }
    }

    fn request_dataset(&mut self, dataset_id: String) -> Transition {
        self.epoch += 1;
        let ticket = LoadTicket {
            epoch: self.epoch,
            dataset_id,
        };
        log::info!(
            "controller: requesting dataset '{}' (epoch {})",
            ticket.dataset_id,
            self.epoch
        );
        self.pending = Some(ticket.clone());

        let mut transition = Transition::none();
        if let Some(stop) = self.stop_playback() {
            transition = transition.with_effect(stop);
        }
        transition.with_effect(Effect::FetchDataset(ticket))
    }

    fn apply_dataset(&mut self, ticket: LoadTicket, result: anyhow::Result<Dataset>) -> Transition {
        if self.pending.as_ref() != Some(&ticket) {
            log::info!(
                "controller: discarding stale load of '{}' (epoch {}, current {})",
                ticket.dataset_id,
                ticket.epoch,
                self.epoch
            );
            return Transition::none();
        }
        self.pending = None;

        let dataset = match result {
            Ok(dataset) => dataset,
            Err(err) => {
                log::warn!("controller: failed to load '{}': {:#}", ticket.dataset_id, err);
                return Transition::none();
            }
        };

        self.metrics = dataset.metrics();
        self.dataset = dataset;
        self.state.dataset_id = Some(ticket.dataset_id.clone());
        self.colors.reset();
        self.state.selection.clear();
        self.state.cursor = 0;
        self.state.metric = self.metrics.first().cloned();
        self.rebuild_series();
        log::info!(
            "controller: dataset '{}' ready with {} metrics over {} dates",
            ticket.dataset_id,
            self.metrics.len(),
            self.dataset.temporal().len()
        );
        Transition::render(self.derive(ChartChange::Redraw))
    }

    fn apply_registry(&mut self, layer: LayerMode, registry: RegionRegistry) -> Transition {
        if layer != self.state.layer_mode {
            log::info!("controller: discarding registry for inactive layer {}", layer);
            return Transition::none();
        }
        self.registry = registry;
        Transition::render(self.derive(ChartChange::Redraw))
    }

    fn select_metric(&mut self, metric: String) -> Transition {
        if !self.state.layer_mode.carries_data() {
            return Transition::none();
        }
        if !self.metrics.contains(&metric) {
            log::warn!("controller: ignoring unknown metric '{}'", metric);
            return Transition::none();
        }
        self.state.metric = Some(metric);
        self.rebuild_series();
        self.state.cursor = self.dataset.temporal().clamp(self.state.cursor);
        Transition::render(self.derive(ChartChange::Redraw))
    }

    fn move_cursor(&mut self, cursor: usize) -> Transition {
        if !self.state.layer_mode.carries_data() || self.dataset.temporal().is_empty() {
            return Transition::none();
        }
        self.state.cursor = self.dataset.temporal().clamp(cursor);
        Transition::render(self.derive(ChartChange::Highlight))
    }

    fn toggle_play(&mut self) -> Transition {
        if let Some(stop) = self.stop_playback() {
            return Transition::none().with_effect(stop);
        }
        let Some(last) = self.dataset.temporal().last_index() else {
            return Transition::none();
        };
        if !self.state.layer_mode.carries_data() || self.state.cursor >= last {
            return Transition::none();
        }
        self.state.is_playing = true;
        self.play_generation += 1;
        Transition::none().with_effect(Effect::StartPlayback {
            generation: self.play_generation,
        })
    }

    fn tick(&mut self, generation: u64) -> Transition {
        if !self.state.is_playing || generation != self.play_generation {
            return Transition::none();
        }
        let temporal = self.dataset.temporal();
        self.state.cursor = temporal.clamp(self.state.cursor + 1);
        let reached_end = temporal.last_index().map_or(true, |last| self.state.cursor >= last);

        let transition = Transition::render(self.derive(ChartChange::Highlight));
        if reached_end {
            match self.stop_playback() {
                Some(stop) => transition.with_effect(stop),
                None => transition,
            }
        } else {
            transition
        }
    }

    fn toggle_region(&mut self, region_id: &str) -> Transition {
        if !self.state.layer_mode.carries_data() {
            return Transition::none();
        }
        let added = self.state.toggle_region(region_id);
        log::debug!(
            "controller: region '{}' {}",
            region_id,
            if added { "selected" } else { "deselected" }
        );
        Transition::render(self.derive(ChartChange::Redraw))
    }

    fn clear_selection(&mut self) -> Transition {
        if !self.state.layer_mode.carries_data() {
            return Transition::none();
        }
        self.state.selection.clear();
        Transition::render(self.derive(ChartChange::Redraw))
    }

    fn switch_layer(&mut self, layer: LayerMode) -> Transition {
        if layer == self.state.layer_mode {
            return Transition::none();
        }
        log::info!("controller: switching layer {} -> {}", self.state.layer_mode, layer);
        self.state.layer_mode = layer;
        self.state.selection.clear();
        self.registry = RegionRegistry::default();

        let render = if layer.carries_data() {
            self.derive(ChartChange::Redraw)
        } else {
            RenderInstruction::empty(self.state.cursor)
        };
        let mut transition = Transition::render(render);
        if let Some(stop) = self.stop_playback() {
            transition = transition.with_effect(stop);
        }
        transition.with_effect(Effect::FetchRegistry(layer))
    }

    fn stop_playback(&mut self) -> Option<Effect> {
        if self.state.is_playing {
            self.state.is_playing = false;
            Some(Effect::StopPlayback)
        } else {
            None
        }
    }

    fn rebuild_series(&mut self) {
        self.series = match self.state.metric.as_deref() {
            Some(metric) => self.dataset.series(metric),
            None => SeriesTable::default(),
        };
    }

    /// Class breaks for the values at the cursor date.
    pub fn current_breaks(&self) -> Option<ClassBreaks> {
        let date = self.dataset.temporal().get(self.state.cursor)?;
        classify(&self.series.values_at(&date), self.config.class_count)
    }

    fn derive(&mut self, change: ChartChange) -> RenderInstruction {
        if !self.state.layer_mode.carries_data() {
            return RenderInstruction::empty(self.state.cursor);
        }
        let cursor = self.state.cursor;
        let date = self.dataset.temporal().get(cursor);
        let breaks = self.current_breaks();

        let mut seen: HashSet<&str> = HashSet::new();
        let region_ids: Vec<&str> = self
            .registry
            .ids()
            .iter()
            .chain(self.series.regions())
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        let regions = region_ids
            .into_iter()
            .map(|region_id| {
                let value = date.and_then(|d| self.series.value(region_id, &d));
                let class = value
                    .zip(breaks.as_ref())
                    .and_then(|(value, breaks)| breaks.class_of(value));
                let fill = match class {
                    Some(index) => RegionFill::Class {
                        index,
                        color: class_color(&self.config.palette, index)
                            .unwrap_or_default()
                            .to_string(),
                    },
                    None => RegionFill::NoData,
                };
                let name = self.registry.display_name(region_id);
                RegionStyle {
                    region_id: region_id.to_string(),
                    hover_label: format!(
                        "{}: {}",
                        name,
                        format_value(value, &self.config.unit_label)
                    ),
                    name,
                    fill,
                    value,
                    selected: self.state.is_selected(region_id),
                }
            })
            .collect();

        let map = MapUpdate {
            controls_enabled: true,
            cursor,
            date_label: self.dataset.temporal().label(cursor).map(str::to_string),
            break_labels: breaks
                .as_ref()
                .map(|b| b.bounds().iter().map(|v| format_break(*v)).collect())
                .unwrap_or_default(),
            breaks: breaks.clone(),
            regions,
        };
        let legend = breaks
            .as_ref()
            .map(|b| legend_entries(b, &self.config.palette))
            .unwrap_or_default();

        let chart = match change {
            ChartChange::Highlight => ChartUpdate::Highlight(cursor),
            ChartChange::Redraw if self.state.metric.is_none() => ChartUpdate::Clear,
            ChartChange::Redraw => ChartUpdate::Redraw(build_series_set(
                SeriesRequest {
                    series: &self.series,
                    axis: self.dataset.temporal(),
                    registry: &self.registry,
                    selection: &self.state.selection,
                    metric: self.state.metric.as_deref(),
                    unit: &self.config.unit_label,
                    cursor,
                    max_series: self.config.max_chart_series,
                },
                &mut self.colors,
            )),
        };

        RenderInstruction { map, legend, chart }
    }

    /// CSV snapshot of the active metric for the current selection.
    pub fn export_csv(&self) -> anyhow::Result<String> {
        let Some(metric) = self.state.metric.as_deref() else {
            anyhow::bail!("Select dataset and metric first");
        };
        export::selection_csv(
            self.dataset.records(),
            &self.config.schema,
            metric,
            &self.state.selection,
        )
    }

    /// GeoJSON snapshot of the selected regions' boundaries.
    pub fn export_geojson(&self) -> anyhow::Result<serde_json::Value> {
        export::selection_geojson(&self.registry, &self.state.selection)
    }
}
