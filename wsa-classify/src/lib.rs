//! Classification of metric samples into choropleth classes.
//!
//! This crate turns the values of one metric at one date into class
//! boundaries, assigns values to classes and builds the matching legend.

pub mod natural_breaks;

pub use natural_breaks::{classify, ClassBreaks};

/// Legend swatches and labels for a set of class breaks.
pub mod legend {
    use crate::ClassBreaks;
    use serde::Serialize;
    use wsa_utils::numbers::range_label;

    /// Default number of choropleth classes.
    pub const DEFAULT_CLASS_COUNT: usize = 5;

    /// Sequential blue-green ramp, light to dark.
    pub const SEQUENTIAL_GREENS: [&str; 5] = ["#edf8fb", "#b2e2e2", "#66c2a4", "#2ca25f", "#006d2c"];

    /// Label of the trailing legend entry for regions without a value.
    pub const NO_DATA_LABEL: &str = "No data";

    /// What a legend swatch is filled with.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(tag = "kind", content = "color", rename_all = "snake_case")]
    pub enum Swatch {
        Color(String),
        NoDataHatch,
    }

    /// One legend row.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct LegendEntry {
        pub swatch: Swatch,
        pub label: String,
    }

    /// Color of class `class`; classes beyond the palette reuse its last color.
    pub fn class_color(palette: &[String], class: usize) -> Option<&str> {
        palette
            .get(class)
            .or_else(|| palette.last())
            .map(String::as_str)
    }

    /// One entry per class, followed by the "No data" entry.
    pub fn legend_entries(breaks: &ClassBreaks, palette: &[String]) -> Vec<LegendEntry> {
        let mut entries: Vec<LegendEntry> = breaks
            .intervals()
            .enumerate()
            .map(|(class, (lower, upper))| LegendEntry {
                swatch: Swatch::Color(class_color(palette, class).unwrap_or("#cccccc").to_string()),
                label: range_label(lower, upper),
            })
            .collect();
        entries.push(LegendEntry {
            swatch: Swatch::NoDataHatch,
            label: NO_DATA_LABEL.to_string(),
        });
        entries
    }

}
