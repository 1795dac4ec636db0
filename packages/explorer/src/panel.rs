//! Highlighted region and header text.

use std::collections::BTreeMap;

use covid_map_snapshot_models::{RegionSnapshot, Snapshot, UNKNOWN_DISTRICT_KEY};
use covid_map_statistic::dates::format_date;
use serde::Serialize;

/// chrono pattern for the header timestamp, e.g. `31 Oct, 9:12 AM`.
const HEADER_DATE_PATTERN: &str = "%d %b, %-I:%M %p";

/// The region the user is hovering or has tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionHighlight {
    /// State code, or `TT` for the country.
    pub state_code: String,
    /// District within the state, if one is highlighted.
    pub district_name: Option<String>,
}

impl RegionHighlight {
    /// Highlights a whole state (or the country).
    #[must_use]
    pub fn state(state_code: impl Into<String>) -> Self {
        Self {
            state_code: state_code.into(),
            district_name: None,
        }
    }

    /// Highlights a district of a state.
    #[must_use]
    pub fn district(state_code: impl Into<String>, district_name: impl Into<String>) -> Self {
        Self {
            state_code: state_code.into(),
            district_name: Some(district_name.into()),
        }
    }

    /// Looks the highlighted region up in a snapshot.
    #[must_use]
    pub fn region<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a RegionSnapshot> {
        let state = snapshot.get(&self.state_code)?;
        match &self.district_name {
            Some(name) => state.district(name),
            None => Some(state),
        }
    }

    /// Whether the highlight points at a real district of a state that
    /// only reports aggregate totals.
    #[must_use]
    pub fn lacks_district_data(&self, no_district_data: &BTreeMap<String, bool>) -> bool {
        self.district_name
            .as_deref()
            .is_some_and(|name| name != UNKNOWN_DISTRICT_KEY)
            && no_district_data.get(&self.state_code).copied().unwrap_or(false)
    }
}

/// Everything the side panel shows for the highlighted region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPanel {
    /// District name or state name.
    pub name: String,
    /// Raw map value; may be NaN when the region has no data.
    pub value: f64,
    /// Display text for the value.
    pub text: String,
    /// Heading colour: the zone colour if the statistic has a colour
    /// scale, else the statistic colour.
    pub color: String,
}

/// `Last Updated on 31 Oct, 9:12 AM IST`, from the region's
/// `meta.last_updated`.
#[must_use]
pub fn last_updated_line(region: Option<&RegionSnapshot>) -> Option<String> {
    let last_updated = region?.meta.as_ref()?.last_updated.as_deref()?;
    let formatted = format_date(Some(last_updated), HEADER_DATE_PATTERN);
    if formatted.is_empty() {
        log::warn!("Unparseable last_updated timestamp: {last_updated}");
        return None;
    }
    Some(format!("Last Updated on {formatted} IST"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        serde_json::from_str(
            r#"{
                "TT": {"meta": {"last_updated": "2021-10-31T09:12:32+05:30"}},
                "AS": {"districts": {"Kamrup": {}, "Unknown": {}}},
                "MH": {"districts": {"Pune": {}}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_state_and_district() {
        let snapshot = snapshot();
        assert!(RegionHighlight::state("MH").region(&snapshot).is_some());
        assert!(RegionHighlight::district("MH", "Pune").region(&snapshot).is_some());
        assert!(RegionHighlight::district("MH", "Nagpur").region(&snapshot).is_none());
        assert!(RegionHighlight::state("KL").region(&snapshot).is_none());
    }

    #[test]
    fn district_data_flag_needs_real_district() {
        let flags = BTreeMap::from([("AS".to_string(), true), ("MH".to_string(), false)]);
        assert!(RegionHighlight::district("AS", "Kamrup").lacks_district_data(&flags));
        assert!(!RegionHighlight::district("AS", UNKNOWN_DISTRICT_KEY).lacks_district_data(&flags));
        assert!(!RegionHighlight::state("AS").lacks_district_data(&flags));
        assert!(!RegionHighlight::district("MH", "Pune").lacks_district_data(&flags));
        assert!(!RegionHighlight::district("KL", "Wayanad").lacks_district_data(&flags));
    }

    #[test]
    fn header_line() {
        let snapshot = snapshot();
        assert_eq!(
            last_updated_line(snapshot.get("TT")).as_deref(),
            Some("Last Updated on 31 Oct, 9:12 AM IST")
        );
        assert_eq!(last_updated_line(snapshot.get("AS")), None);
        assert_eq!(last_updated_line(None), None);
    }
}
