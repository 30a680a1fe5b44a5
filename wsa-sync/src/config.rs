use serde::{Deserialize, Serialize};
use std::time::Duration;
use wsa_classify::legend::{DEFAULT_CLASS_COUNT, SEQUENTIAL_GREENS};
use wsa_data::{DatePolicy, RecordSchema, DEFAULT_NAME_FIELD};

use crate::chart::QUALITATIVE_PALETTE;

/// Default interval between playback steps.
pub const DEFAULT_TICK_MS: u64 = 600;

/// Default cap on chart series drawn when nothing is selected.
pub const DEFAULT_MAX_CHART_SERIES: usize = 20;

/// Default minimum time the chart loading indicator stays up.
pub const DEFAULT_MIN_LOADING_MS: u64 = 50;

/// Tunables for a map session.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Number of choropleth classes.
    pub class_count: usize,
    pub tick_interval_ms: u64,
    pub max_chart_series: usize,
    pub min_loading_display_ms: u64,
    /// Choropleth colors, lightest class first.
    pub palette: Vec<String>,
    /// Colors handed out to chart series in order of first appearance.
    pub series_palette: Vec<String>,
    pub schema: RecordSchema,
    /// Boundary feature property holding the region display name.
    pub name_field: String,
    pub unit_label: String,
    pub date_policy: DatePolicy,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            class_count: DEFAULT_CLASS_COUNT,
            tick_interval_ms: DEFAULT_TICK_MS,
            max_chart_series: DEFAULT_MAX_CHART_SERIES,
            min_loading_display_ms: DEFAULT_MIN_LOADING_MS,
            palette: SEQUENTIAL_GREENS.iter().map(|c| c.to_string()).collect(),
            series_palette: QUALITATIVE_PALETTE.iter().map(|c| c.to_string()).collect(),
            schema: RecordSchema::default(),
            name_field: DEFAULT_NAME_FIELD.to_string(),
            unit_label: "mm/month".to_string(),
            date_policy: DatePolicy::default(),
        }
    }
}

impl ViewConfig {
    /// Parse a JSON config, filling unspecified keys with defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: ViewConfig = serde_json::from_str(json)?;
        if config.class_count == 0 {
            anyhow::bail!("class_count must be at least 1");
        }
        if config.palette.is_empty() || config.series_palette.is_empty() {
            anyhow::bail!("palettes must not be empty");
        }
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn min_loading_display(&self) -> Duration {
        Duration::from_millis(self.min_loading_display_ms)
    }
}
