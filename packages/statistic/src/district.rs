//! No-district-data heuristic.
//!
//! Some regions publish only aggregate totals: every case sits in the
//! unknown-district bucket. Such regions are flagged so district-level
//! detail can be suppressed instead of showing misleading zeros.

use std::collections::BTreeMap;

use covid_map_snapshot_models::{AggregationType, RegionSnapshot, Snapshot};
use covid_map_statistic_models::ResolveOptions;

use crate::registry::StatisticRegistry;
use crate::resolve::resolve_with;

/// Returns `true` when the region's unknown-district totals equal the
/// region's own totals for every primary statistic.
///
/// Regions without a district map or without an unknown-district bucket
/// are never flagged.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn has_no_district_data(registry: &StatisticRegistry, region: &RegionSnapshot) -> bool {
    let Some(unknown) = region.unknown_district() else {
        return false;
    };
    let options = ResolveOptions::default();

    registry.primary().iter().all(|&statistic| {
        resolve_with(registry, Some(region), AggregationType::Total, statistic, &options)
            == resolve_with(registry, Some(unknown), AggregationType::Total, statistic, &options)
    })
}

/// Flags every region of a snapshot with [`has_no_district_data`].
///
/// Recompute whenever the snapshot is replaced.
#[must_use]
pub fn no_district_data_regions(
    registry: &StatisticRegistry,
    snapshot: &Snapshot,
) -> BTreeMap<String, bool> {
    let flags: BTreeMap<String, bool> = snapshot
        .iter()
        .map(|(code, region)| (code.clone(), has_no_district_data(registry, region)))
        .collect();

    let flagged: Vec<&str> = flags
        .iter()
        .filter(|(_, flagged)| **flagged)
        .map(|(code, _)| code.as_str())
        .collect();
    log::debug!("Regions without district data: {flagged:?}");

    flags
}
