//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use covid_map_explorer::{
    Bubble, Dashboard, MapSettings, MapView, MapViz, RegionHighlight, RegionPanel,
};
use covid_map_snapshot::poller::SnapshotPoller;
use covid_map_snapshot::source::SnapshotSource;
use covid_map_snapshot_models::{AggregationType, Snapshot, TOTAL_REGION_CODE};
use covid_map_statistic::dates::{format_last_updated, india_now};
use covid_map_statistic::{NumberFormatter, NumberLocale, StatisticRegistry, resolve_with};
use covid_map_statistic_models::{
    PopulationUnit, ResolveOptions, StatisticFormat, StatisticKind,
};
use serde::Serialize;

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

/// Arguments of `resolve`.
#[derive(Debug, Clone)]
pub struct ResolveQuery {
    pub region: String,
    pub district: Option<String>,
    pub statistic: StatisticKind,
    pub aggregation: AggregationType,
    pub per: Option<PopulationUnit>,
    pub moving_average: bool,
    pub can_be_nan: bool,
    pub format: Option<StatisticFormat>,
}

#[derive(Debug, Serialize)]
struct ResolveReport {
    region: String,
    district: Option<String>,
    statistic: StatisticKind,
    aggregation: AggregationType,
    value: f64,
    text: String,
}

/// Arguments of `map`.
#[derive(Debug, Clone)]
pub struct MapQuery {
    pub statistic: StatisticKind,
    pub map_code: String,
    pub view: MapView,
    pub per_lakh: bool,
    pub delta7: bool,
}

#[derive(Debug, Serialize)]
struct MapReport {
    statistic: StatisticKind,
    map_code: String,
    viz: MapViz,
    district_view: bool,
    statistic_max: Option<f64>,
    domain_max: f64,
    panel: RegionPanel,
    bubbles: Vec<Bubble>,
}

#[derive(Debug, Serialize)]
struct FormatReport {
    value: f64,
    format: StatisticFormat,
    text: String,
}

fn resolve_report(
    registry: &StatisticRegistry,
    snapshot: &Snapshot,
    query: &ResolveQuery,
) -> ResolveReport {
    let region = snapshot.get(&query.region);
    let data = match &query.district {
        Some(name) => region.and_then(|r| r.district(name)),
        None => region,
    };
    if data.is_none() {
        log::warn!(
            "Region {}{} not found in snapshot",
            query.region,
            query
                .district
                .as_deref()
                .map(|d| format!("/{d}"))
                .unwrap_or_default()
        );
    }

    let options = ResolveOptions {
        normalized_by_population_per: query.per,
        moving_average: query.moving_average,
        can_be_nan: query.can_be_nan,
        expired_date: None,
    };
    let value = resolve_with(registry, data, query.aggregation, query.statistic, &options);

    let format = query
        .format
        .or_else(|| registry.get(query.statistic).map(|c| c.format))
        .unwrap_or_default();
    let text = NumberFormatter::new(registry, NumberLocale::default()).format_number(
        value,
        format,
        Some(query.statistic),
    );

    ResolveReport {
        region: query.region.clone(),
        district: query.district.clone(),
        statistic: query.statistic,
        aggregation: query.aggregation,
        value,
        text,
    }
}

/// Prints one resolved statistic.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn resolve(
    registry: &StatisticRegistry,
    snapshot: &Snapshot,
    query: &ResolveQuery,
    output: Output,
) -> Result<(), serde_json::Error> {
    let report = resolve_report(registry, snapshot, query);
    output.emit(&report, || {
        format!("{} {} ({}): {}", report.region, report.statistic, report.aggregation, report.text)
    })
}

/// Prints a formatted number.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn format(
    registry: &StatisticRegistry,
    value: f64,
    format: StatisticFormat,
    statistic: Option<StatisticKind>,
    language: Option<&str>,
    output: Output,
) -> Result<(), serde_json::Error> {
    let formatter = NumberFormatter::new(registry, NumberLocale::for_language(language));
    let report = FormatReport {
        value,
        format,
        text: formatter.format_number(value, format, statistic),
    };
    output.emit(&report, || report.text.clone())
}

fn map_report(registry: &StatisticRegistry, dashboard: &Dashboard, query: &MapQuery) -> MapReport {
    let mut settings = MapSettings::new(query.statistic);
    settings.per_lakh = query.per_lakh;
    settings.delta7_mode = query.delta7;

    let explorer = dashboard.explorer(registry, query.map_code.clone(), query.view, settings);
    let snapshot = dashboard.snapshot();
    let highlight = RegionHighlight::state(query.map_code.clone());

    MapReport {
        statistic: query.statistic,
        map_code: query.map_code.clone(),
        viz: explorer.viz(),
        district_view: explorer.is_district_view(),
        statistic_max: explorer.statistic_max(snapshot, None),
        domain_max: explorer.bubble_scale(snapshot, None).domain_max(),
        panel: explorer.panel(
            snapshot,
            &highlight,
            dashboard.hides_district_data(&highlight),
            NumberLocale::default(),
        ),
        bubbles: explorer.bubbles(snapshot, None),
    }
}

/// Prints the map summary and bubble table.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn map(
    registry: &StatisticRegistry,
    snapshot: Arc<Snapshot>,
    query: &MapQuery,
    output: Output,
) -> Result<(), serde_json::Error> {
    let dashboard = Dashboard::new(registry, snapshot);
    let report = map_report(registry, &dashboard, query);
    let formatter = NumberFormatter::new(registry, NumberLocale::default());

    output.emit(&report, || {
        let mut lines = vec![
            format!("{}: {} ({})", report.panel.name, report.panel.text, report.statistic),
            format!(
                "viz: {}, district view: {}, max: {}, bubble domain: [0, {}]",
                report.viz,
                report.district_view,
                report
                    .statistic_max
                    .map_or_else(|| "-".to_string(), |max| formatter.abbreviate_number(max)),
                formatter.abbreviate_number(report.domain_max),
            ),
        ];
        if !report.bubbles.is_empty() {
            lines.push(format!("{:<6} {:<24} {:>12} {:>8}", "STATE", "DISTRICT", "VALUE", "RADIUS"));
            lines.push("-".repeat(53));
            for bubble in &report.bubbles {
                lines.push(format!(
                    "{:<6} {:<24} {:>12} {:>8.1}",
                    bubble.state_code,
                    bubble.district.as_deref().unwrap_or(""),
                    formatter.abbreviate_number(bubble.value),
                    bubble.radius
                ));
            }
        }
        lines.join("\n")
    })
}

/// Prints the no-district-data flag of every region.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn districts(
    registry: &StatisticRegistry,
    snapshot: &Snapshot,
    output: Output,
) -> Result<(), serde_json::Error> {
    let flags = covid_map_statistic::no_district_data_regions(registry, snapshot);
    output.emit(&flags, || {
        let mut lines = vec![format!("{:<8} NO DISTRICT DATA", "REGION"), "-".repeat(26)];
        lines.extend(
            flags
                .iter()
                .map(|(code, flagged)| format!("{code:<8} {flagged}")),
        );
        lines.join("\n")
    })
}

/// One log line per refresh: the header plus the country's confirmed and
/// active counts.
fn refresh_summary(registry: &StatisticRegistry, dashboard: &Dashboard) -> String {
    let formatter = NumberFormatter::new(registry, NumberLocale::default());
    let country = dashboard.snapshot().get(TOTAL_REGION_CODE);
    let count = |statistic| {
        formatter.format_number(
            resolve_with(
                registry,
                country,
                AggregationType::Total,
                statistic,
                &ResolveOptions::default(),
            ),
            StatisticFormat::Long,
            Some(statistic),
        )
    };

    let updated = country
        .and_then(|c| c.meta.as_ref())
        .and_then(|meta| meta.last_updated.as_deref())
        .and_then(|ts| format_last_updated(ts, india_now()))
        .map_or_else(String::new, |ago| format!(" ({ago} ago)"));

    format!(
        "{}{updated}: confirmed {}, active {}",
        dashboard.header().unwrap_or_else(|| "No timestamp".to_string()),
        count(StatisticKind::Confirmed),
        count(StatisticKind::Active),
    )
}

/// Polls `source` every `interval` until interrupted, logging each
/// refresh.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
pub async fn watch(
    registry: &StatisticRegistry,
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
) -> Result<(), std::io::Error> {
    log::info!("Watching {} every {}s", source.location(), interval.as_secs());
    let (poller, mut receiver) = SnapshotPoller::new(source, interval);
    let handle = tokio::spawn(poller.run());

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = receiver.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    let dashboard = Dashboard::new(registry, snapshot);
                    log::info!("{}", refresh_summary(registry, &dashboard));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                log::info!("Stopping");
                break;
            }
        }
    }

    drop(receiver);
    handle.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use covid_map_statistic::default_registry;

    use super::*;

    fn snapshot() -> Snapshot {
        serde_json::from_str(
            r#"{
                "TT": {
                    "total": {"confirmed": 3420000, "recovered": 3300000, "deceased": 45000},
                    "meta": {"population": 1380000000, "last_updated": "2021-10-31T09:12:32+05:30"}
                },
                "MH": {
                    "total": {"confirmed": 600, "recovered": 500, "deceased": 10},
                    "meta": {"population": 100000},
                    "districts": {"Pune": {"total": {"confirmed": 400}}}
                },
                "KL": {"total": {"confirmed": 300}}
            }"#,
        )
        .unwrap()
    }

    fn query(region: &str, statistic: StatisticKind) -> ResolveQuery {
        ResolveQuery {
            region: region.to_string(),
            district: None,
            statistic,
            aggregation: AggregationType::Total,
            per: None,
            moving_average: false,
            can_be_nan: false,
            format: None,
        }
    }

    #[test]
    fn resolve_uses_configured_format() {
        let report = resolve_report(default_registry(), &snapshot(), &query("MH", StatisticKind::Active));
        assert!((report.value - 90.0).abs() < f64::EPSILON);
        assert_eq!(report.text, "90");
    }

    #[test]
    fn resolve_district_and_override_format() {
        let mut query = query("TT", StatisticKind::Confirmed);
        query.format = Some(StatisticFormat::Short);
        let report = resolve_report(default_registry(), &snapshot(), &query);
        assert_eq!(report.text, "34.2L");

        let mut query = self::query("MH", StatisticKind::Confirmed);
        query.district = Some("Pune".to_string());
        let report = resolve_report(default_registry(), &snapshot(), &query);
        assert!((report.value - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_region_resolves_to_zero() {
        let report = resolve_report(default_registry(), &snapshot(), &query("DL", StatisticKind::Confirmed));
        assert!(report.value.abs() < f64::EPSILON);
    }

    #[test]
    fn map_report_for_country() {
        let dashboard = Dashboard::new(default_registry(), Arc::new(snapshot()));
        let report = map_report(
            default_registry(),
            &dashboard,
            &MapQuery {
                statistic: StatisticKind::Confirmed,
                map_code: TOTAL_REGION_CODE.to_string(),
                view: MapView::States,
                per_lakh: false,
                delta7: false,
            },
        );
        assert_eq!(report.viz, MapViz::Bubble);
        assert_eq!(report.statistic_max, Some(600.0));
        assert_eq!(report.panel.name, "India");
        assert_eq!(report.bubbles.len(), 2);
        assert_eq!(report.bubbles[0].state_code, "MH");
    }

    #[test]
    fn refresh_summary_includes_header_and_counts() {
        let dashboard = Dashboard::new(default_registry(), Arc::new(snapshot()));
        let summary = refresh_summary(default_registry(), &dashboard);
        assert!(
            summary.starts_with("Last Updated on 31 Oct, 9:12 AM IST"),
            "unexpected summary: {summary}"
        );
        assert!(summary.ends_with("confirmed 34,20,000, active 75,000"), "unexpected summary: {summary}");
    }
}
