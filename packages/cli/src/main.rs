#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the COVID-19 map statistics.
//!
//! Loads a snapshot (local file, explicit URL, or the data API for a
//! given day) and prints resolved statistics, formatted numbers, map
//! values and no-district-data flags. `watch` keeps polling the data API
//! and logs the header line on every refresh.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use covid_map_explorer::MapView;
use covid_map_snapshot::source::{FileSource, HttpSource, SnapshotSource};
use covid_map_snapshot::{API_REFRESH_INTERVAL, data_api_root, snapshot_url};
use covid_map_snapshot_models::{AggregationType, TOTAL_REGION_CODE};
use covid_map_statistic::{StatisticRegistry, default_registry};
use covid_map_statistic_models::{PopulationUnit, StatisticFormat, StatisticKind};

mod commands;

#[derive(Parser)]
#[command(name = "covid_map", about = "COVID-19 snapshot statistics")]
struct Cli {
    /// Read the snapshot from a local JSON file
    #[arg(long, global = true, conflicts_with_all = ["url", "date"])]
    file: Option<PathBuf>,

    /// Fetch the snapshot from this URL instead of the data API
    #[arg(long, global = true, conflicts_with = "date")]
    url: Option<String>,

    /// Fetch the data API snapshot for a past day (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Statistic registry TOML to use instead of the built-in one
    #[arg(long, global = true)]
    statistics: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one statistic for a region
    Resolve {
        /// Region code (e.g. "TT", "MH")
        #[arg(long, default_value = TOTAL_REGION_CODE)]
        region: String,
        /// District within the region
        #[arg(long)]
        district: Option<String>,
        /// Statistic (e.g. "confirmed", "activeRatio")
        #[arg(long)]
        statistic: StatisticKind,
        /// Aggregation bucket: total, delta or delta7
        #[arg(long = "type", default_value = "total")]
        aggregation: AggregationType,
        /// Normalise per hundred, thousand, lakh or million people
        #[arg(long)]
        per: Option<PopulationUnit>,
        /// Use the 7-day moving average for daily changes
        #[arg(long)]
        moving_average: bool,
        /// Keep NaN instead of coercing it to zero
        #[arg(long)]
        can_be_nan: bool,
        /// Number format; defaults to the statistic's configured format
        #[arg(long)]
        format: Option<StatisticFormat>,
    },
    /// Format a number for display
    Format {
        #[arg(allow_hyphen_values = true)]
        value: f64,
        /// Number format: long, short, % or plain
        #[arg(long, default_value = "plain")]
        format: StatisticFormat,
        /// Statistic whose `hide_zero` setting applies
        #[arg(long)]
        statistic: Option<StatisticKind>,
        /// Language tag selecting digit grouping (e.g. "en-IN", "en-US")
        #[arg(long)]
        language: Option<String>,
    },
    /// Show the visualization, maximum and bubbles for a map
    Map {
        #[arg(long)]
        statistic: StatisticKind,
        /// "TT" for the country map, or a state code
        #[arg(long, default_value = TOTAL_REGION_CODE)]
        map_code: String,
        /// states or districts
        #[arg(long, default_value = "states")]
        view: MapView,
        /// Normalise values per lakh population
        #[arg(long)]
        per_lakh: bool,
        /// Show the trailing 7-day change
        #[arg(long)]
        delta7: bool,
    },
    /// List which regions only report aggregate totals
    Districts,
    /// Poll the data API and log every refresh
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = API_REFRESH_INTERVAL.as_secs())]
        interval: u64,
    },
}

impl Cli {
    fn source(&self) -> Arc<dyn SnapshotSource> {
        if let Some(path) = &self.file {
            return Arc::new(FileSource::new(path));
        }
        let url = self
            .url
            .clone()
            .unwrap_or_else(|| snapshot_url(&data_api_root(), self.date));
        Arc::new(HttpSource::new(url))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let loaded;
    let registry: &StatisticRegistry = if let Some(path) = &cli.statistics {
        log::info!("Loading statistic registry from {}", path.display());
        loaded = StatisticRegistry::from_path(path)?;
        &loaded
    } else {
        default_registry()
    };

    let source = cli.source();
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Format {
            value,
            format,
            statistic,
            language,
        } => {
            commands::format(registry, value, format, statistic, language.as_deref(), output)?;
        }
        Commands::Resolve {
            region,
            district,
            statistic,
            aggregation,
            per,
            moving_average,
            can_be_nan,
            format,
        } => {
            let snapshot = source.fetch().await?;
            let query = commands::ResolveQuery {
                region,
                district,
                statistic,
                aggregation,
                per,
                moving_average,
                can_be_nan,
                format,
            };
            commands::resolve(registry, &snapshot, &query, output)?;
        }
        Commands::Map {
            statistic,
            map_code,
            view,
            per_lakh,
            delta7,
        } => {
            let snapshot = Arc::new(source.fetch().await?);
            let query = commands::MapQuery {
                statistic,
                map_code,
                view,
                per_lakh,
                delta7,
            };
            commands::map(registry, snapshot, &query, output)?;
        }
        Commands::Districts => {
            let snapshot = source.fetch().await?;
            commands::districts(registry, &snapshot, output)?;
        }
        Commands::Watch { interval } => {
            commands::watch(registry, source, Duration::from_secs(interval.max(1))).await?;
        }
    }

    Ok(())
}
