//! The view state tuple owned by the controller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which boundary layer is shown. Only watersheds carry metric data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMode {
    #[default]
    Watersheds,
    Basins,
    Subbasins,
}

impl LayerMode {
    /// True for the layer whose regions are classified and charted.
    pub fn carries_data(self) -> bool {
        matches!(self, LayerMode::Watersheds)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerMode::Watersheds => "watersheds",
            LayerMode::Basins => "basins",
            LayerMode::Subbasins => "subbasins",
        }
    }
}

impl fmt::Display for LayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watersheds" => Ok(LayerMode::Watersheds),
            "basins" => Ok(LayerMode::Basins),
            "subbasins" => Ok(LayerMode::Subbasins),
            other => Err(format!("unknown layer '{}'", other)),
        }
    }
}

/// Active dataset, metric, cursor, selection and layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub dataset_id: Option<String>,
    pub metric: Option<String>,
    /// Index into the dataset's date axis.
    pub cursor: usize,
    /// Selected region ids; empty means nothing is selected.
    pub selection: BTreeSet<String>,
    pub layer_mode: LayerMode,
    pub is_playing: bool,
}

impl ViewState {
    /// Add the region if absent, remove it if present.
    pub fn toggle_region(&mut self, region_id: &str) -> bool {
        if self.selection.remove(region_id) {
            false
        } else {
            self.selection.insert(region_id.to_string());
            true
        }
    }

    pub fn is_selected(&self, region_id: &str) -> bool {
        self.selection.contains(region_id)
    }
}
