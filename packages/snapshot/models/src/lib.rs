#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region snapshot tree types.
//!
//! A snapshot is a single pre-aggregated JSON document keyed by region code
//! (`"TT"` for the whole country, two-letter codes for states). Every value
//! is a [`RegionSnapshot`], and states nest their districts as further
//! [`RegionSnapshot`]s. A snapshot is received wholesale on each poll tick
//! and never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Region code of the country-wide aggregate.
pub const TOTAL_REGION_CODE: &str = "TT";

/// Reserved district key for cases not attributed to a specific district.
pub const UNKNOWN_DISTRICT_KEY: &str = "Unknown";

/// Mapping from statistic name (`"confirmed"`, `"tested"`, ...) to count.
pub type Bucket = BTreeMap<String, f64>;

/// A full snapshot: region code to region data.
pub type Snapshot = BTreeMap<String, RegionSnapshot>;

/// Which aggregation bucket of a region to read.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationType {
    /// Cumulative counts.
    #[default]
    Total,
    /// Daily change.
    Delta,
    /// Trailing 7-day sum of daily changes.
    Delta7,
}

/// Date of the most recent update for a sub-dataset (testing, vaccination).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedMeta {
    /// ISO date (`YYYY-MM-DD`) the sub-dataset was last updated.
    #[serde(default)]
    pub date: Option<String>,
}

/// Optional metadata attached to a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionMeta {
    /// Population estimate used for per-capita normalisation.
    #[serde(default)]
    pub population: Option<f64>,
    /// ISO date the case data refers to.
    #[serde(default)]
    pub date: Option<String>,
    /// Timestamp of the last upstream update.
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Free-form notes shown next to the region.
    #[serde(default)]
    pub notes: Option<String>,
    /// Testing metadata.
    #[serde(default)]
    pub tested: Option<DatedMeta>,
    /// Vaccination metadata.
    #[serde(default)]
    pub vaccinated: Option<DatedMeta>,
}

/// One geographic region (country, state or district) at a point in time.
///
/// Districts nest the same type, so the whole snapshot is a single
/// recursive tree. Every field is optional in the source JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    /// Region metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RegionMeta>,
    /// Cumulative counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Bucket>,
    /// Daily change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Bucket>,
    /// Trailing 7-day change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta7: Option<Bucket>,
    /// District breakdown, keyed by district name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub districts: Option<BTreeMap<String, Self>>,
}

impl RegionSnapshot {
    /// Returns the bucket for the given aggregation, if present.
    #[must_use]
    pub const fn bucket(&self, aggregation: AggregationType) -> Option<&Bucket> {
        match aggregation {
            AggregationType::Total => self.total.as_ref(),
            AggregationType::Delta => self.delta.as_ref(),
            AggregationType::Delta7 => self.delta7.as_ref(),
        }
    }

    /// Reads a single field from a bucket. `None` when the bucket or the
    /// field is missing.
    #[must_use]
    pub fn field(&self, aggregation: AggregationType, name: &str) -> Option<f64> {
        self.bucket(aggregation)?.get(name).copied()
    }

    /// Population from the region metadata.
    #[must_use]
    pub fn population(&self) -> Option<f64> {
        self.meta.as_ref()?.population
    }

    /// Looks up a district by name.
    #[must_use]
    pub fn district(&self, name: &str) -> Option<&Self> {
        self.districts.as_ref()?.get(name)
    }

    /// The unknown-district bucket, if the region reports one.
    #[must_use]
    pub fn unknown_district(&self) -> Option<&Self> {
        self.district(UNKNOWN_DISTRICT_KEY)
    }
}
