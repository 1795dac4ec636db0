#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistic identifiers and their display configuration.
//!
//! Every statistic shown on the dashboard is a [`StatisticKind`]. How it is
//! formatted, whether it may be normalised by population, and how it is
//! encoded on the map is described by a [`StatisticConfig`], supplied by an
//! external registry loaded once at startup.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A statistic identifier.
///
/// The string form (`"confirmed"`, `"activeRatio"`, ...) is also the field
/// name read from a snapshot bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatisticKind {
    /// Confirmed cases.
    Confirmed,
    /// `confirmed - deceased - recovered`, derived on demand.
    Active,
    /// Recovered cases.
    Recovered,
    /// Deaths.
    Deceased,
    /// Cases migrated out or closed for other reasons.
    Other,
    /// Samples tested.
    Tested,
    /// First vaccine doses.
    Vaccinated1,
    /// Second vaccine doses.
    Vaccinated2,
    /// `100 * active / confirmed`, derived on demand.
    ActiveRatio,
}

/// Number-format hint for a statistic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum StatisticFormat {
    /// Full precision with locale grouping.
    #[serde(rename = "long")]
    #[strum(serialize = "long")]
    Long,
    /// Abbreviated with Indian-system suffixes (K, L, Cr).
    #[serde(rename = "short")]
    #[strum(serialize = "short")]
    Short,
    /// One decimal place followed by `%`.
    #[serde(rename = "%")]
    #[strum(to_string = "%", serialize = "percent")]
    Percent,
    /// Locale-grouped number with at most one decimal place.
    #[default]
    #[serde(rename = "")]
    #[strum(to_string = "", serialize = "plain")]
    Plain,
}

/// Unit for per-capita normalisation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PopulationUnit {
    /// Per 100 people.
    Hundred,
    /// Per 1,000 people.
    Thousand,
    /// Per 1,00,000 people.
    Lakh,
    /// Per 1,000,000 people.
    Million,
}

impl PopulationUnit {
    /// Number of people the unit stands for.
    #[must_use]
    pub const fn size(self) -> f64 {
        match self {
            Self::Hundred => 1e2,
            Self::Thousand => 1e3,
            Self::Lakh => 1e5,
            Self::Million => 1e6,
        }
    }
}

/// Options controlling how a statistic value is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Normalise by population, expressed per this unit.
    pub normalized_by_population_per: Option<PopulationUnit>,
    /// Read `delta7` and divide by seven when `delta` is requested.
    pub moving_average: bool,
    /// Pass NaN through instead of coercing it to zero.
    pub can_be_nan: bool,
    /// Date after which the data counts as stale. Carried for display only.
    pub expired_date: Option<String>,
}

impl ResolveOptions {
    #[must_use]
    pub const fn per(mut self, unit: PopulationUnit) -> Self {
        self.normalized_by_population_per = Some(unit);
        self
    }

    #[must_use]
    pub const fn moving_average(mut self) -> Self {
        self.moving_average = true;
        self
    }

    #[must_use]
    pub const fn can_be_nan(mut self) -> Self {
        self.can_be_nan = true;
        self
    }
}

/// Value transform applied before colour or size encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Clamp into `[min, max]`.
    Clamp {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Absolute value.
    Abs,
}

impl Transform {
    /// Applies the transform. NaN stays NaN.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Clamp { min, max } => value.clamp(min, max),
            Self::Abs => value.abs(),
        }
    }
}

/// Threshold colour scale: `range[i]` covers values below `domain[i]`,
/// the last colour covers everything at or above the last threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    /// Ascending thresholds.
    pub domain: Vec<f64>,
    /// Colours, one more than the number of thresholds.
    pub range: Vec<String>,
}

impl ColorScale {
    /// Colour for a value, `None` for NaN or a malformed scale.
    #[must_use]
    pub fn color(&self, value: f64) -> Option<&str> {
        if value.is_nan() {
            return None;
        }
        let index = self.domain.partition_point(|threshold| *threshold <= value);
        self.range.get(index).map(String::as_str)
    }
}

/// How a statistic is encoded on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Draw spikes instead of bubbles or fills.
    #[serde(default)]
    pub spike: bool,
    /// Zone colours for choropleth fills and the panel heading.
    #[serde(default)]
    pub color_scale: Option<ColorScale>,
    /// Applied to values before the colour scale and bubble sizing.
    #[serde(default)]
    pub transform: Option<Transform>,
}

/// Display configuration for one statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticConfig {
    /// Label shown in switchers and headers.
    pub display_name: String,
    /// CSS colour (`#rrggbb`).
    pub color: String,
    /// Number-format hint.
    #[serde(default)]
    pub format: StatisticFormat,
    /// Render zero as the blank placeholder.
    #[serde(default)]
    pub hide_zero: bool,
    /// Keep infinite results instead of coercing them to zero.
    #[serde(default)]
    pub can_be_infinite: bool,
    /// Already relative (ratios, percentages); never population-normalised.
    #[serde(default)]
    pub non_linear: bool,
    /// Counted from primary statistics, so hidden when district data is absent.
    #[serde(default)]
    pub has_primary: bool,
    /// The statistic has a meaningful daily change.
    #[serde(default)]
    pub show_delta: bool,
    /// Only the 7-day aggregate is meaningful on the map.
    #[serde(default)]
    pub only_delta7: bool,
    /// Map encoding.
    #[serde(default)]
    pub map: Option<MapConfig>,
}

impl StatisticConfig {
    /// Colour scale from the map config, if any.
    #[must_use]
    pub fn color_scale(&self) -> Option<&ColorScale> {
        self.map.as_ref()?.color_scale.as_ref()
    }

    /// Applies the configured transform, or returns the value unchanged.
    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        self.map
            .as_ref()
            .and_then(|map| map.transform)
            .map_or(value, |transform| transform.apply(value))
    }
}
