//! User-facing map settings and the choices derived from them.

use covid_map_snapshot_models::AggregationType;
use covid_map_statistic_models::{PopulationUnit, ResolveOptions, StatisticConfig, StatisticKind};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// How values are drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MapViz {
    /// Circles sized by value.
    Bubble,
    /// Regions filled by value.
    Choropleth,
    /// Vertical spikes sized by value.
    Spike,
}

/// Which regions the map shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MapView {
    /// One region per state.
    #[default]
    States,
    /// One region per district (state maps only).
    Districts,
}

/// Whether a map shows the whole country or a single state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MapKind {
    /// The country map (`TT`).
    Country,
    /// A single state's map.
    State,
}

/// Statistic and display toggles chosen in the map switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSettings {
    /// Statistic shown on the map.
    pub statistic: StatisticKind,
    /// Normalise values per lakh population.
    pub per_lakh: bool,
    /// Show the trailing 7-day change instead of the cumulative total.
    pub delta7_mode: bool,
    /// Staleness marker passed through to every resolved value.
    pub expired_date: Option<String>,
}

impl MapSettings {
    #[must_use]
    pub const fn new(statistic: StatisticKind) -> Self {
        Self {
            statistic,
            per_lakh: false,
            delta7_mode: false,
            expired_date: None,
        }
    }

    /// Bucket the map reads: `delta7` when the statistic has a daily
    /// change and 7-day mode is on, or when only its 7-day change is
    /// meaningful; otherwise `total`.
    #[must_use]
    pub fn aggregation(&self, config: Option<&StatisticConfig>) -> AggregationType {
        let show_delta = config.is_some_and(|c| c.show_delta);
        let only_delta7 = config.is_some_and(|c| c.only_delta7);
        if (show_delta && self.delta7_mode) || only_delta7 {
            AggregationType::Delta7
        } else {
            AggregationType::Total
        }
    }

    /// Resolve options for map values. NaN is kept so regions without
    /// data can be told apart from regions with zero.
    #[must_use]
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            normalized_by_population_per: self.per_lakh.then_some(PopulationUnit::Lakh),
            moving_average: false,
            can_be_nan: true,
            expired_date: self.expired_date.clone(),
        }
    }

    /// Spikes when configured; fills for per-lakh, zoned or non-linear
    /// statistics; bubbles otherwise.
    #[must_use]
    pub fn viz(&self, config: Option<&StatisticConfig>) -> MapViz {
        let map = config.and_then(|c| c.map.as_ref());
        if map.is_some_and(|m| m.spike) {
            MapViz::Spike
        } else if self.per_lakh
            || map.is_some_and(|m| m.color_scale.is_some())
            || config.is_some_and(|c| c.non_linear)
        {
            MapViz::Choropleth
        } else {
            MapViz::Bubble
        }
    }
}

#[cfg(test)]
mod tests {
    use covid_map_statistic::default_registry;
    use covid_map_statistic_models::{ColorScale, MapConfig};

    use super::*;

    fn config(kind: StatisticKind) -> StatisticConfig {
        default_registry().get(kind).unwrap().clone()
    }

    #[test]
    fn delta7_mode_only_applies_to_statistics_with_delta() {
        let mut settings = MapSettings::new(StatisticKind::Confirmed);
        assert_eq!(
            settings.aggregation(Some(&config(StatisticKind::Confirmed))),
            AggregationType::Total
        );

        settings.delta7_mode = true;
        assert_eq!(
            settings.aggregation(Some(&config(StatisticKind::Confirmed))),
            AggregationType::Delta7
        );
        assert_eq!(
            settings.aggregation(Some(&config(StatisticKind::Active))),
            AggregationType::Total
        );
    }

    #[test]
    fn only_delta7_forces_delta7() {
        let mut only = config(StatisticKind::Vaccinated1);
        only.only_delta7 = true;
        let settings = MapSettings::new(StatisticKind::Vaccinated1);
        assert_eq!(settings.aggregation(Some(&only)), AggregationType::Delta7);
    }

    #[test]
    fn options_normalise_per_lakh_and_keep_nan() {
        let mut settings = MapSettings::new(StatisticKind::Confirmed);
        assert_eq!(settings.options().normalized_by_population_per, None);
        assert!(settings.options().can_be_nan);

        settings.per_lakh = true;
        settings.expired_date = Some("2021-10-31".to_string());
        let options = settings.options();
        assert_eq!(options.normalized_by_population_per, Some(PopulationUnit::Lakh));
        assert_eq!(options.expired_date.as_deref(), Some("2021-10-31"));
    }

    #[test]
    fn viz_choice() {
        let mut settings = MapSettings::new(StatisticKind::Confirmed);
        assert_eq!(settings.viz(Some(&config(StatisticKind::Confirmed))), MapViz::Bubble);
        assert_eq!(
            settings.viz(Some(&config(StatisticKind::ActiveRatio))),
            MapViz::Choropleth
        );

        let mut zoned = config(StatisticKind::Tested);
        zoned.map = Some(MapConfig {
            color_scale: Some(ColorScale {
                domain: vec![1.0],
                range: vec!["#fff".into(), "#000".into()],
            }),
            ..MapConfig::default()
        });
        assert_eq!(settings.viz(Some(&zoned)), MapViz::Choropleth);

        let mut spiked = config(StatisticKind::Confirmed);
        spiked.map = Some(MapConfig {
            spike: true,
            ..MapConfig::default()
        });
        settings.per_lakh = true;
        assert_eq!(settings.viz(Some(&spiked)), MapViz::Spike);
        assert_eq!(
            settings.viz(Some(&config(StatisticKind::Confirmed))),
            MapViz::Choropleth
        );
    }
}
