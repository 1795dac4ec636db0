//! Statistic value computation.
//!
//! [`resolve`] derives the single number displayed for a region: it picks
//! the aggregation bucket, derives `active`/`activeRatio`, applies the
//! moving-average and per-capita multipliers, and finally applies the NaN
//! and infinity policies. Missing data never errors; it degrades to zero
//! or NaN.

use covid_map_snapshot_models::{AggregationType, Bucket, RegionSnapshot};
use covid_map_statistic_models::{ResolveOptions, StatisticKind};

use crate::registry::{StatisticRegistry, default_registry};

/// Days in the trailing window of the `delta7` bucket.
const MOVING_AVERAGE_DAYS: f64 = 7.0;

/// Resolves a statistic using the embedded registry.
///
/// See [`resolve_with`].
#[must_use]
pub fn resolve(
    data: Option<&RegionSnapshot>,
    aggregation: AggregationType,
    statistic: StatisticKind,
    options: &ResolveOptions,
) -> f64 {
    resolve_with(default_registry(), data, aggregation, statistic, options)
}

/// Resolves a statistic for one region.
///
/// * `data` may be `None` (region missing, snapshot not yet loaded).
/// * When `aggregation` is [`AggregationType::Delta`] and
///   `options.moving_average` is set, the `delta7` bucket is read instead
///   and divided by seven.
/// * Per-capita normalisation multiplies by `unit / population`; a missing
///   population makes the multiplier NaN.
/// * Statistics configured as non-linear ignore every multiplier.
/// * NaN becomes `0.0` unless `options.can_be_nan`; infinities become
///   `0.0` unless the statistic's config sets `can_be_infinite`.
#[must_use]
pub fn resolve_with(
    registry: &StatisticRegistry,
    data: Option<&RegionSnapshot>,
    aggregation: AggregationType,
    statistic: StatisticKind,
    options: &ResolveOptions,
) -> f64 {
    let mut aggregation = aggregation;
    let mut multiplier = 1.0;

    if aggregation == AggregationType::Delta && options.moving_average {
        aggregation = AggregationType::Delta7;
        multiplier /= MOVING_AVERAGE_DAYS;
    }

    if let Some(unit) = options.normalized_by_population_per {
        let population = data.and_then(RegionSnapshot::population).unwrap_or(f64::NAN);
        multiplier *= unit.size() / population;
    }

    let bucket = data.and_then(|region| region.bucket(aggregation));
    let value = bucket_value(bucket, statistic);

    let config = registry.get(statistic);
    if config.is_some_and(|c| c.non_linear) {
        multiplier = 1.0;
    }

    let mut result = multiplier * value;
    if !options.can_be_nan && result.is_nan() {
        result = 0.0;
    }
    if !config.is_some_and(|c| c.can_be_infinite) && result.is_infinite() {
        result = 0.0;
    }
    result
}

/// Reads or derives the raw value from a bucket, before any multiplier.
///
/// Direct reads of a missing field yield NaN; the components of derived
/// statistics default to zero.
fn bucket_value(bucket: Option<&Bucket>, statistic: StatisticKind) -> f64 {
    let field = |kind: StatisticKind| bucket.and_then(|b| b.get(kind.as_ref())).copied();

    match statistic {
        StatisticKind::Active | StatisticKind::ActiveRatio => {
            let component = |kind| field(kind).filter(|v: &f64| !v.is_nan()).unwrap_or(0.0);
            let confirmed = component(StatisticKind::Confirmed);
            let active = confirmed
                - component(StatisticKind::Deceased)
                - component(StatisticKind::Recovered);
            if statistic == StatisticKind::Active {
                active
            } else {
                100.0 * (active / confirmed)
            }
        }
        _ => field(statistic).unwrap_or(f64::NAN),
    }
}
