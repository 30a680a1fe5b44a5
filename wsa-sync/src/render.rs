//! Render instructions and the collaborator entry points they are pushed to.
//!
//! The controller never calls into the map, chart or legend directly. It
//! derives a [`RenderInstruction`] and [`publish`] hands each collaborator its
//! part; collaborators never read controller state.

use crate::chart::ChartSeriesSet;
use serde::Serialize;
use wsa_classify::legend::LegendEntry;
use wsa_classify::ClassBreaks;

/// How one region polygon is filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionFill {
    Class { index: usize, color: String },
    /// Hatched "no data" fill.
    NoData,
}

/// Style of one region polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStyle {
    pub region_id: String,
    pub name: String,
    pub fill: RegionFill,
    /// Value at the cursor date.
    pub value: Option<f64>,
    /// Hover text, e.g. "Ili: 12.50 mm/month".
    pub hover_label: String,
    /// Selected regions get an emphasized outline.
    pub selected: bool,
}

/// Map part of a render instruction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MapUpdate {
    /// Date, metric and playback controls are only usable on the data layer.
    pub controls_enabled: bool,
    pub cursor: usize,
    pub date_label: Option<String>,
    pub breaks: Option<ClassBreaks>,
    pub break_labels: Vec<String>,
    pub regions: Vec<RegionStyle>,
}

/// Chart part of a render instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartUpdate {
    /// Replace every series.
    Redraw(ChartSeriesSet),
    /// Keep the series, move the highlighted point to this date index.
    Highlight(usize),
    /// Remove all series.
    Clear,
}

/// Complete output of one controller transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    pub map: MapUpdate,
    pub legend: Vec<LegendEntry>,
    pub chart: ChartUpdate,
}

impl RenderInstruction {
    /// Instruction for a layer without data: no classes, no legend, no series.
    pub fn empty(cursor: usize) -> Self {
        Self {
            map: MapUpdate {
                cursor,
                ..Default::default()
            },
            legend: Vec::new(),
            chart: ChartUpdate::Clear,
        }
    }
}

pub trait MapView {
    fn update_map(&mut self, update: &MapUpdate);
}

pub trait LegendView {
    fn update_legend(&mut self, entries: &[LegendEntry]);
}

pub trait ChartView {
    /// Show or hide the loading indicator.
    fn set_loading(&mut self, loading: bool);
    fn update_chart(&mut self, update: &ChartUpdate);
}

/// Push an instruction to all three collaborators.
pub fn publish(
    instruction: &RenderInstruction,
    map: &mut dyn MapView,
    chart: &mut dyn ChartView,
    legend: &mut dyn LegendView,
) {
    map.update_map(&instruction.map);
    legend.update_legend(&instruction.legend);
    chart.update_chart(&instruction.chart);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        maps: usize,
        legends: Vec<usize>,
        charts: Vec<ChartUpdate>,
    }

    impl MapView for Recorder {
        fn update_map(&mut self, _update: &MapUpdate) {
            self.maps += 1;
        }
    }

    impl LegendView for Recorder {
        fn update_legend(&mut self, entries: &[LegendEntry]) {
            self.legends.push(entries.len());
        }
    }

    impl ChartView for Recorder {
        fn set_loading(&mut self, _loading: bool) {}
        fn update_chart(&mut self, update: &ChartUpdate) {
            self.charts.push(update.clone());
        }
    }

    #[test]
    fn test_publish_empty_instruction() {
        let mut map = Recorder::default();
        let mut chart = Recorder::default();
        let mut legend = Recorder::default();
        publish(&RenderInstruction::empty(3), &mut map, &mut chart, &mut legend);
        assert_eq!(map.maps, 1);
        assert_eq!(legend.legends, vec![0]);
        assert_eq!(chart.charts, vec![ChartUpdate::Clear]);
    }

    #[test]
    fn test_empty_instruction_disables_controls() {
        let instruction = RenderInstruction::empty(2);
        assert!(!instruction.map.controls_enabled);
        assert_eq!(instruction.map.cursor, 2);
        assert!(instruction.map.breaks.is_none());
    }
}
