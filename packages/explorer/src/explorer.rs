//! Map values for one map (country or state) under one set of settings.

use std::collections::{BTreeMap, BTreeSet};

use covid_map_snapshot_models::{RegionSnapshot, Snapshot, TOTAL_REGION_CODE, UNKNOWN_DISTRICT_KEY};
use covid_map_statistic::format::BLANK;
use covid_map_statistic::{NumberFormatter, NumberLocale, StatisticRegistry, resolve_with};
use covid_map_statistic_models::StatisticConfig;
use serde::Serialize;

use crate::panel::{RegionHighlight, RegionPanel};
use crate::scale::BubbleScale;
use crate::settings::{MapKind, MapSettings, MapView, MapViz};
use crate::states::{is_state_code, state_name};

/// Heading colour when the statistic is not configured.
const FALLBACK_COLOR: &str = "#343a40";

/// District names drawn by the map geometry, per state code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistrictGeometry {
    districts: BTreeMap<String, BTreeSet<String>>,
}

impl DistrictGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a district shape.
    pub fn insert(&mut self, state_code: impl Into<String>, district: impl Into<String>) {
        self.districts
            .entry(state_code.into())
            .or_default()
            .insert(district.into());
    }

    /// Whether the geometry has a shape for this district.
    #[must_use]
    pub fn contains(&self, state_code: &str, district: &str) -> bool {
        self.districts
            .get(state_code)
            .is_some_and(|districts| districts.contains(district))
    }
}

impl<S: Into<String>, D: Into<String>> FromIterator<(S, D)> for DistrictGeometry {
    fn from_iter<I: IntoIterator<Item = (S, D)>>(iter: I) -> Self {
        let mut geometry = Self::new();
        for (state_code, district) in iter {
            geometry.insert(state_code, district);
        }
        geometry
    }
}

/// One region drawn on the map with its resolved value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRegion {
    pub state_code: String,
    /// `None` for a whole state.
    pub district: Option<String>,
    pub value: f64,
}

/// A sized circle for the bubble visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub state_code: String,
    pub district: Option<String>,
    pub value: f64,
    /// Radius in pixels.
    pub radius: f64,
}

/// Map values for a country or state map.
#[derive(Debug, Clone)]
pub struct MapExplorer<'a> {
    registry: &'a StatisticRegistry,
    map_code: String,
    view: MapView,
    settings: MapSettings,
}

impl<'a> MapExplorer<'a> {
    #[must_use]
    pub fn new(
        registry: &'a StatisticRegistry,
        map_code: impl Into<String>,
        view: MapView,
        settings: MapSettings,
    ) -> Self {
        Self {
            registry,
            map_code: map_code.into(),
            view,
            settings,
        }
    }

    #[must_use]
    pub fn map_code(&self) -> &str {
        &self.map_code
    }

    #[must_use]
    pub const fn settings(&self) -> &MapSettings {
        &self.settings
    }

    #[must_use]
    pub fn config(&self) -> Option<&'a StatisticConfig> {
        self.registry.get(self.settings.statistic)
    }

    #[must_use]
    pub fn map_kind(&self) -> MapKind {
        if self.map_code == TOTAL_REGION_CODE {
            MapKind::Country
        } else {
            MapKind::State
        }
    }

    /// District view only applies to state maps.
    #[must_use]
    pub fn is_district_view(&self) -> bool {
        self.view == MapView::Districts && self.map_kind() == MapKind::State
    }

    #[must_use]
    pub fn viz(&self) -> MapViz {
        self.settings.viz(self.config())
    }

    /// The map value for a region. NaN when the region has no data.
    #[must_use]
    pub fn value(&self, data: Option<&RegionSnapshot>) -> f64 {
        resolve_with(
            self.registry,
            data,
            self.settings.aggregation(self.config()),
            self.settings.statistic,
            &self.settings.options(),
        )
    }

    /// Applies the statistic's map transform, if any.
    #[must_use]
    pub fn transformed(&self, value: f64) -> f64 {
        self.config().map_or(value, |config| config.transform(value))
    }

    /// State codes this map covers: every known state of the snapshot for
    /// the country map, or just the map's own state.
    fn state_codes<'s>(&self, snapshot: &'s Snapshot) -> Vec<&'s str> {
        snapshot
            .keys()
            .map(String::as_str)
            .filter(|code| *code != TOTAL_REGION_CODE && is_state_code(code))
            .filter(|code| self.map_kind() == MapKind::Country || *code == self.map_code)
            .collect()
    }

    /// Districts of a state drawn in district view. The unknown bucket is
    /// kept only when `with_unknown` is set.
    fn districts<'s>(
        state_code: &str,
        state: &'s RegionSnapshot,
        geometry: Option<&DistrictGeometry>,
        with_unknown: bool,
    ) -> impl Iterator<Item = (&'s str, &'s RegionSnapshot)> {
        state
            .districts
            .iter()
            .flatten()
            .map(|(name, district)| (name.as_str(), district))
            .filter(move |(name, _)| {
                if *name == UNKNOWN_DISTRICT_KEY {
                    with_unknown
                } else {
                    geometry.is_none_or(|geometry| geometry.contains(state_code, name))
                }
            })
    }

    /// Every region the map draws, with its value.
    #[must_use]
    pub fn map_data(&self, snapshot: &Snapshot, geometry: Option<&DistrictGeometry>) -> Vec<MapRegion> {
        let district_view = self.is_district_view();
        let mut regions = Vec::new();

        for code in self.state_codes(snapshot) {
            let state = &snapshot[code];
            if district_view {
                regions.extend(Self::districts(code, state, geometry, false).map(
                    |(name, district)| MapRegion {
                        state_code: code.to_string(),
                        district: Some(name.to_string()),
                        value: self.value(Some(district)),
                    },
                ));
            } else {
                regions.push(MapRegion {
                    state_code: code.to_string(),
                    district: None,
                    value: self.value(Some(state)),
                });
            }
        }
        regions
    }

    /// Largest transformed value on the map, ignoring NaN. In district
    /// view the unknown-district bucket counts unless the map is a
    /// choropleth.
    #[must_use]
    pub fn statistic_max(&self, snapshot: &Snapshot, geometry: Option<&DistrictGeometry>) -> Option<f64> {
        let with_unknown = self.viz() != MapViz::Choropleth;
        let district_view = self.is_district_view();

        self.state_codes(snapshot)
            .into_iter()
            .flat_map(|code| {
                let state = &snapshot[code];
                if district_view {
                    Self::districts(code, state, geometry, with_unknown)
                        .map(|(_, district)| self.transformed(self.value(Some(district))))
                        .collect::<Vec<_>>()
                } else {
                    vec![self.transformed(self.value(Some(state)))]
                }
            })
            .filter(|value| !value.is_nan())
            .reduce(f64::max)
    }

    #[must_use]
    pub fn bubble_scale(&self, snapshot: &Snapshot, geometry: Option<&DistrictGeometry>) -> BubbleScale {
        BubbleScale::new(self.statistic_max(snapshot, geometry))
    }

    /// Bubbles for positive values, largest first. Empty unless the map
    /// uses the bubble visualization.
    #[must_use]
    pub fn bubbles(&self, snapshot: &Snapshot, geometry: Option<&DistrictGeometry>) -> Vec<Bubble> {
        if self.viz() != MapViz::Bubble {
            return Vec::new();
        }

        let scale = self.bubble_scale(snapshot, geometry);
        let mut bubbles: Vec<Bubble> = self
            .map_data(snapshot, geometry)
            .into_iter()
            .filter(|region| region.value > 0.0)
            .map(|region| Bubble {
                radius: scale.radius(region.value),
                state_code: region.state_code,
                district: region.district,
                value: region.value,
            })
            .collect();
        bubbles.sort_by(|a, b| b.value.total_cmp(&a.value));

        log::debug!(
            "{} bubbles for {} on {}",
            bubbles.len(),
            self.settings.statistic,
            self.map_code
        );
        bubbles
    }

    /// Side-panel contents for the highlighted region.
    ///
    /// The value is blanked when the highlighted district's state has no
    /// real district data and the statistic is counted from primary
    /// statistics.
    #[must_use]
    pub fn panel(
        &self,
        snapshot: &Snapshot,
        highlight: &RegionHighlight,
        hide_district_data: bool,
        locale: NumberLocale,
    ) -> RegionPanel {
        let config = self.config();
        let value = self.value(highlight.region(snapshot));

        let name = highlight
            .district_name
            .clone()
            .or_else(|| state_name(&highlight.state_code).map(str::to_string))
            .unwrap_or_else(|| highlight.state_code.clone());

        let text = if hide_district_data && config.is_some_and(|c| c.has_primary) {
            BLANK.to_string()
        } else {
            let format = config.map(|c| c.format).unwrap_or_default();
            NumberFormatter::new(self.registry, locale).format_number(
                value,
                format,
                Some(self.settings.statistic),
            )
        };

        let zone = config
            .and_then(StatisticConfig::color_scale)
            .and_then(|scale| scale.color(self.transformed(value)));
        let color = zone
            .or_else(|| config.map(|c| c.color.as_str()))
            .unwrap_or(FALLBACK_COLOR)
            .to_string();

        RegionPanel {
            name,
            value,
            text,
            color,
        }
    }
}
