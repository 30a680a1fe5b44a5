//! Cross-view synchronization for the watershed metric map.
//!
//! This crate provides:
//! - `controller`: the single owner of view state; every UI event is one transition
//! - `render`: render instructions and the map / chart / legend collaborator traits
//! - `session`: the event loop that fetches data, drives playback and publishes
//! - `playback`: the cancellable tick timer behind play/pause
//! - `export`: CSV and GeoJSON snapshots of the current selection

pub mod chart;
pub mod config;
pub mod controller;
pub mod export;
pub mod playback;
pub mod render;
pub mod session;
pub mod state;

pub use config::ViewConfig;
pub use controller::{Effect, LoadTicket, Transition, ViewEvent, ViewSyncController};
pub use render::{ChartUpdate, ChartView, LegendView, MapUpdate, MapView, RenderInstruction};
pub use session::{Session, SourceFetcher};
pub use state::{LayerMode, ViewState};
pub use wsa_classify::legend::LegendEntry;
