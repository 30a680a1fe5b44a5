//! Event loop tying the controller to I/O.
//!
//! The session is the only place that touches the outside world: it spawns
//! dataset and boundary fetches, runs the playback timer and pushes render
//! instructions to the collaborators. Everything it learns comes back in as a
//! [`ViewEvent`] on its channel, so the controller sees one event at a time.

use crate::config::ViewConfig;
use crate::controller::{Effect, LoadTicket, ViewEvent, ViewSyncController};
use crate::playback::PlaybackTimer;
use crate::render::{self, ChartUpdate, ChartView, LegendView, MapView, RenderInstruction};
use crate::state::LayerMode;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use wsa_data::loader::parse_records;
use wsa_data::{Dataset, DatePolicy, RecordSchema, RegionRegistry};

/// Future returned by [`SourceFetcher::fetch`].
pub type FetchFuture = Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send>>;

/// Retrieves the raw bytes behind a dataset or boundary location.
pub trait SourceFetcher: Send + Sync + 'static {
    fn fetch(&self, location: String) -> FetchFuture;
}

/// Fetch and parse a dataset.
pub async fn load_dataset(
    fetcher: &dyn SourceFetcher,
    location: String,
    schema: &RecordSchema,
    policy: DatePolicy,
) -> anyhow::Result<Dataset> {
    let bytes = fetcher.fetch(location.clone()).await?;
    let records = parse_records(&bytes, &location, schema)?;
    let dataset = Dataset::assemble(records, policy)?;
    log::info!(
        "session: loaded {} records from {} ({} dropped)",
        dataset.records().len(),
        location,
        dataset.dropped()
    );
    Ok(dataset)
}

/// Fetch a boundary GeoJSON and build its name registry.
pub async fn load_registry(
    fetcher: &dyn SourceFetcher,
    location: String,
    id_field: &str,
    name_field: &str,
) -> anyhow::Result<RegionRegistry> {
    let bytes = fetcher.fetch(location).await?;
    let text = String::from_utf8(bytes)?;
    Ok(RegionRegistry::from_geojson_str(&text, id_field, name_field)?)
}

pub struct Session<M, C, L> {
    controller: ViewSyncController,
    map: M,
    chart: C,
    legend: L,
    tx: UnboundedSender<ViewEvent>,
    rx: UnboundedReceiver<ViewEvent>,
    timer: PlaybackTimer,
    fetcher: Arc<dyn SourceFetcher>,
    boundary_sources: HashMap<LayerMode, String>,
}

impl<M, C, L> Session<M, C, L>
where
    M: MapView,
    C: ChartView,
    L: LegendView,
{
    pub fn new(
        config: ViewConfig,
        fetcher: Arc<dyn SourceFetcher>,
        map: M,
        chart: C,
        legend: L,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let timer = PlaybackTimer::new(config.tick_interval());
        Self {
            controller: ViewSyncController::new(config),
            map,
            chart,
            legend,
            tx,
            rx,
            timer,
            fetcher,
            boundary_sources: HashMap::new(),
        }
    }

    /// Register the boundary GeoJSON location of a layer.
    pub fn with_boundaries(mut self, layer: LayerMode, location: impl Into<String>) -> Self {
        self.boundary_sources.insert(layer, location.into());
        self
    }

    /// Handle for feeding events from outside the loop.
    pub fn sender(&self) -> UnboundedSender<ViewEvent> {
        self.tx.clone()
    }

    pub fn controller(&self) -> &ViewSyncController {
        &self.controller
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn legend(&self) -> &L {
        &self.legend
    }

    /// Start loading the boundaries of the active layer.
    pub fn load_boundaries(&self) {
        self.spawn_registry_fetch(self.controller.state().layer_mode);
    }

    /// Run one event through the controller and carry out the result.
    pub async fn handle(&mut self, event: ViewEvent) {
        let transition = self.controller.handle(event);
        for effect in transition.effects {
            self.apply(effect);
        }
        if let Some(instruction) = transition.render {
            self.publish(instruction).await;
        }
    }

    /// Process events until `done` holds for the controller.
    pub async fn run_until<F>(&mut self, mut done: F)
    where
        F: FnMut(&ViewSyncController) -> bool,
    {
        while !done(&self.controller) {
            match self.rx.recv().await {
                Some(event) => self.handle(event).await,
                None => break,
            }
        }
    }

    /// Process every event already waiting on the channel.
    pub async fn process_pending(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event).await;
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::FetchDataset(ticket) => self.spawn_dataset_fetch(ticket),
            Effect::FetchRegistry(layer) => self.spawn_registry_fetch(layer),
            Effect::StartPlayback { generation } => self.timer.start(generation, self.tx.clone()),
            Effect::StopPlayback => self.timer.stop(),
        }
    }

    fn spawn_dataset_fetch(&self, ticket: LoadTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let schema = self.controller.config().schema.clone();
        let policy = self.controller.config().date_policy;
        tokio::spawn(async move {
            let location = ticket.dataset_id().to_string();
            let result = load_dataset(fetcher.as_ref(), location, &schema, policy).await;
            // The receiver only goes away with the session itself.
            let _ = tx.send(ViewEvent::DatasetLoaded { ticket, result });
        });
    }

    fn spawn_registry_fetch(&self, layer: LayerMode) {
        let Some(location) = self.boundary_sources.get(&layer).cloned() else {
            log::debug!("session: no boundaries configured for layer {}", layer);
            return;
        };
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let id_field = self.controller.config().schema.region_field.clone();
        let name_field = self.controller.config().name_field.clone();
        tokio::spawn(async move {
            match load_registry(fetcher.as_ref(), location.clone(), &id_field, &name_field).await {
                Ok(registry) => {
                    let _ = tx.send(ViewEvent::RegistryLoaded { layer, registry });
                }
                Err(err) => log::warn!("session: failed to load boundaries {}: {:#}", location, err),
            }
        });
    }

    async fn publish(&mut self, instruction: RenderInstruction) {
        let redraw = matches!(instruction.chart, ChartUpdate::Redraw(_));
        if redraw {
            self.chart.set_loading(true);
            tokio::time::sleep(self.controller.config().min_loading_display()).await;
        }
        render::publish(&instruction, &mut self.map, &mut self.chart, &mut self.legend);
        if redraw {
            self.chart.set_loading(false);
        }
    }
}
