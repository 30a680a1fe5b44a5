//! Chart series assembly and stable series colors.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use wsa_data::{RegionRegistry, SeriesTable, TemporalIndex};

/// Qualitative palette for chart lines (Dark2 followed by Set3).
pub const QUALITATIVE_PALETTE: [&str; 20] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// Hands out one color per region on first request and keeps it until reset.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    palette: Vec<String>,
    assigned: HashMap<String, String>,
}

impl SeriesColors {
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            palette,
            assigned: HashMap::new(),
        }
    }

    /// Forget every assignment; the next region gets the first palette color.
    pub fn reset(&mut self) {
        self.assigned.clear();
    }

    pub fn color_for(&mut self, region_id: &str) -> String {
        if let Some(color) = self.assigned.get(region_id) {
            return color.clone();
        }
        let color = if self.palette.is_empty() {
            "#666666".to_string()
        } else {
            self.palette[self.assigned.len() % self.palette.len()].clone()
        };
        self.assigned.insert(region_id.to_string(), color.clone());
        color
    }
}

/// One region's line, aligned to the full date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub region_id: String,
    pub label: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
    /// Drawn emphasized because the region is selected.
    pub highlighted: bool,
}

/// Everything the chart needs for a full redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeriesSet {
    pub title: String,
    pub y_label: String,
    /// x-axis labels, one per date of the axis.
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    /// Index of the cursor date.
    pub highlighted_index: Option<usize>,
}

/// Chart title for a metric, e.g. "Runoff (mm/month) – Time Series".
pub fn chart_title(metric: Option<&str>, unit: &str) -> String {
    match metric {
        Some(metric) => format!("{} ({}) – Time Series", metric, unit),
        None => "Time Series".to_string(),
    }
}

/// Inputs for [`build_series_set`].
pub struct SeriesRequest<'a> {
    pub series: &'a SeriesTable,
    pub axis: &'a TemporalIndex,
    pub registry: &'a RegionRegistry,
    pub selection: &'a BTreeSet<String>,
    pub metric: Option<&'a str>,
    pub unit: &'a str,
    pub cursor: usize,
    pub max_series: usize,
}

/// Build the chart series for the current view.
///
/// With a selection only the selected regions are drawn. Without one, every
/// region is drawn up to `max_series`, in first-encounter order.
pub fn build_series_set(request: SeriesRequest<'_>, colors: &mut SeriesColors) -> ChartSeriesSet {
    let SeriesRequest {
        series,
        axis,
        registry,
        selection,
        metric,
        unit,
        cursor,
        max_series,
    } = request;

    let region_ids: Vec<&str> = if selection.is_empty() {
        series
            .regions()
            .iter()
            .take(max_series)
            .map(String::as_str)
            .collect()
    } else {
        let mut ids: Vec<&str> = series
            .regions()
            .iter()
            .filter(|id| selection.contains(*id))
            .map(String::as_str)
            .collect();
        // Selected regions that never appear in the records still get an empty line.
        ids.extend(
            selection
                .iter()
                .filter(|id| !series.regions().contains(*id))
                .map(String::as_str),
        );
        ids
    };

    let lines = region_ids
        .into_iter()
        .map(|region_id| ChartSeries {
            region_id: region_id.to_string(),
            label: registry.display_name(region_id),
            color: colors.color_for(region_id),
            values: series.aligned(region_id, axis),
            highlighted: selection.contains(region_id),
        })
        .collect();

    ChartSeriesSet {
        title: chart_title(metric, unit),
        y_label: metric.map(|m| format!("{} ({})", m, unit)).unwrap_or_default(),
        labels: axis.labels().to_vec(),
        series: lines,
        highlighted_index: (!axis.is_empty()).then(|| axis.clamp(cursor)),
    }
}
