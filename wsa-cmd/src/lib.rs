//! Command implementations for WSA CLI.
//!
//! Provides subcommands for inspecting, classifying, exporting and playing
//! back watershed metric datasets.

use clap::Subcommand;
use std::sync::Arc;

pub mod export;
pub mod fetch;
pub mod inspect;
pub mod play;
pub mod settings;

use fetch::SourceClient;
use settings::SettingsArgs;

#[derive(Subcommand)]
pub enum Command {
    /// List the metrics and date range of a dataset
    Metrics {
        /// Dataset path or URL (.json, .csv, optionally .gz)
        dataset: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print natural breaks, legend and region classes for one date as JSON
    Classify {
        /// Dataset path or URL (.json, .csv, optionally .gz)
        dataset: String,

        /// Metric to classify (defaults to the first discovered metric)
        #[arg(short = 'm', long)]
        metric: Option<String>,

        /// Date to classify, DD.MM.YYYY or YYYY-MM-DD (defaults to the first date)
        #[arg(short = 'd', long)]
        date: Option<String>,

        /// Number of classes
        #[arg(short = 'k', long)]
        classes: Option<usize>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Write the CSV snapshot of a metric for the given regions
    ExportCsv {
        /// Dataset path or URL (.json, .csv, optionally .gz)
        dataset: String,

        #[arg(short = 'm', long)]
        metric: String,

        /// Region to include; repeat for several, omit for all
        #[arg(short = 'r', long = "region")]
        regions: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Write the boundaries of the given regions as a GeoJSON FeatureCollection
    ExportGeojson {
        /// Boundary GeoJSON path or URL
        boundaries: String,

        /// Region to include; repeat for several
        #[arg(short = 'r', long = "region")]
        regions: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Play a dataset through time, logging every map, chart and legend update
    Play {
        /// Dataset path or URL (.json, .csv, optionally .gz)
        dataset: String,

        /// Boundary GeoJSON providing region names
        #[arg(short = 'b', long)]
        boundaries: Option<String>,

        #[arg(short = 'm', long)]
        metric: Option<String>,

        /// Milliseconds between playback steps
        #[arg(short = 't', long)]
        tick_ms: Option<u64>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    let client = SourceClient::new()?;
    match command {
        Command::Metrics { dataset, settings } => {
            let config = settings.load()?;
            inspect::run_metrics(&config, &client, &dataset).await
        }
        Command::Classify {
            dataset,
            metric,
            date,
            classes,
            settings,
        } => {
            let mut config = settings.load()?;
            if let Some(classes) = classes {
                config.class_count = classes.max(1);
            }
            inspect::run_classify(&config, &client, &dataset, metric.as_deref(), date.as_deref())
                .await
        }
        Command::ExportCsv {
            dataset,
            metric,
            regions,
            out,
            settings,
        } => {
            let config = settings.load()?;
            export::run_export_csv(&config, &client, &dataset, &metric, &regions, out.as_deref())
                .await
        }
        Command::ExportGeojson {
            boundaries,
            regions,
            out,
            settings,
        } => {
            let config = settings.load()?;
            export::run_export_geojson(&config, &client, &boundaries, &regions, out.as_deref())
                .await
        }
        Command::Play {
            dataset,
            boundaries,
            metric,
            tick_ms,
            settings,
        } => {
            let mut config = settings.load()?;
            if let Some(tick_ms) = tick_ms {
                config.tick_interval_ms = tick_ms;
            }
            play::run_play(
                config,
                Arc::new(client),
                &dataset,
                boundaries.as_deref(),
                metric.as_deref(),
            )
            .await
        }
    }
}
