//! A loaded snapshot plus the values derived from it once per load.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use covid_map_snapshot_models::{Snapshot, TOTAL_REGION_CODE};
use covid_map_statistic::StatisticRegistry;
use covid_map_statistic::dates::last_data_date;
use covid_map_statistic::no_district_data_regions;

use crate::explorer::MapExplorer;
use crate::panel::{RegionHighlight, last_updated_line};
use crate::settings::{MapSettings, MapView};

/// Snapshot-wide state shared by the header and the map.
///
/// Rebuild it whenever a new snapshot arrives so the derived flags never
/// go stale.
#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Arc<Snapshot>,
    last_data_date: Option<NaiveDate>,
    no_district_data: BTreeMap<String, bool>,
}

impl Dashboard {
    #[must_use]
    pub fn new(registry: &StatisticRegistry, snapshot: Arc<Snapshot>) -> Self {
        let last_data_date = last_data_date(&snapshot);
        let no_district_data = no_district_data_regions(registry, &snapshot);
        log::debug!(
            "Dashboard rebuilt: {} regions, last data date {last_data_date:?}",
            snapshot.len()
        );
        Self {
            snapshot,
            last_data_date,
            no_district_data,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Latest of the country's case, testing and vaccination dates.
    #[must_use]
    pub const fn last_data_date(&self) -> Option<NaiveDate> {
        self.last_data_date
    }

    /// No-district-data flag per region code.
    #[must_use]
    pub const fn no_district_data(&self) -> &BTreeMap<String, bool> {
        &self.no_district_data
    }

    /// The country header line, if the snapshot carries a timestamp.
    #[must_use]
    pub fn header(&self) -> Option<String> {
        last_updated_line(self.snapshot.get(TOTAL_REGION_CODE))
    }

    /// Whether the highlighted district's state only reports totals.
    #[must_use]
    pub fn hides_district_data(&self, highlight: &RegionHighlight) -> bool {
        highlight.lacks_district_data(&self.no_district_data)
    }

    /// A map explorer whose values carry this snapshot's last data date
    /// as the staleness marker.
    #[must_use]
    pub fn explorer<'a>(
        &self,
        registry: &'a StatisticRegistry,
        map_code: impl Into<String>,
        view: MapView,
        mut settings: MapSettings,
    ) -> MapExplorer<'a> {
        settings.expired_date = self.last_data_date.map(|date| date.to_string());
        MapExplorer::new(registry, map_code, view, settings)
    }
}

#[cfg(test)]
mod tests {
    use covid_map_statistic::default_registry;
    use covid_map_statistic_models::StatisticKind;

    use super::*;

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(
            serde_json::from_str(
                r#"{
                    "TT": {
                        "meta": {
                            "date": "2021-10-30",
                            "last_updated": "2021-10-31T09:12:32+05:30",
                            "tested": {"date": "2021-10-31"}
                        },
                        "total": {"confirmed": 100, "recovered": 80, "deceased": 2, "tested": 900}
                    },
                    "AS": {
                        "total": {"confirmed": 10, "recovered": 8, "deceased": 1, "tested": 50},
                        "districts": {
                            "Kamrup": {},
                            "Unknown": {"total": {"confirmed": 10, "recovered": 8, "deceased": 1, "tested": 50}}
                        }
                    },
                    "MH": {
                        "total": {"confirmed": 90, "recovered": 72, "deceased": 1, "tested": 850},
                        "districts": {"Pune": {"total": {"confirmed": 90}}}
                    }
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn precomputes_flags_and_date() {
        let dashboard = Dashboard::new(default_registry(), snapshot());
        assert_eq!(
            dashboard.last_data_date(),
            NaiveDate::from_ymd_opt(2021, 10, 31)
        );
        assert_eq!(dashboard.no_district_data().get("AS"), Some(&true));
        assert_eq!(dashboard.no_district_data().get("MH"), Some(&false));
        assert_eq!(dashboard.no_district_data().get("TT"), Some(&false));
    }

    #[test]
    fn header_and_district_hiding() {
        let dashboard = Dashboard::new(default_registry(), snapshot());
        assert_eq!(
            dashboard.header().as_deref(),
            Some("Last Updated on 31 Oct, 9:12 AM IST")
        );
        assert!(dashboard.hides_district_data(&RegionHighlight::district("AS", "Kamrup")));
        assert!(!dashboard.hides_district_data(&RegionHighlight::district("MH", "Pune")));
    }

    #[test]
    fn explorer_carries_last_data_date() {
        let dashboard = Dashboard::new(default_registry(), snapshot());
        let explorer = dashboard.explorer(
            default_registry(),
            "TT",
            MapView::States,
            MapSettings::new(StatisticKind::Confirmed),
        );
        assert_eq!(
            explorer.settings().expired_date.as_deref(),
            Some("2021-10-31")
        );
    }
}
