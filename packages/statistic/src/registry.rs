//! Statistic registry: display configuration for every statistic.
//!
//! The default registry is `statistics.toml`, baked into the binary at
//! compile time via [`include_str!`] and parsed once into a process-wide
//! read-only table. A replacement registry can be loaded from disk with
//! [`StatisticRegistry::from_path`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use covid_map_statistic_models::{StatisticConfig, StatisticKind, Transform};
use serde::Deserialize;

use crate::StatisticError;

/// TOML config embedded at compile time.
const STATISTICS_TOML: &str = include_str!("../statistics.toml");

static DEFAULT_REGISTRY: LazyLock<StatisticRegistry> = LazyLock::new(|| {
    StatisticRegistry::from_toml_str(STATISTICS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse statistics.toml: {e}"))
});

/// Returns the embedded registry.
///
/// # Panics
///
/// Panics on first use if the embedded TOML is malformed. The file is a
/// compile-time constant, so this is a development error caught by the
/// tests below.
#[must_use]
pub fn default_registry() -> &'static StatisticRegistry {
    &DEFAULT_REGISTRY
}

/// Immutable mapping from statistic to its configuration, plus the list
/// of primary statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticRegistry {
    /// Statistics checked by the no-district-data heuristic.
    primary: Vec<StatisticKind>,
    /// Per-statistic display configuration.
    statistics: BTreeMap<StatisticKind, StatisticConfig>,
}

impl StatisticRegistry {
    /// Parses and validates a registry from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticError::Toml`] if the TOML is malformed, or
    /// [`StatisticError::Invalid`] if a primary statistic has no config,
    /// a colour is empty, or a clamp transform has inverted bounds.
    pub fn from_toml_str(s: &str) -> Result<Self, StatisticError> {
        let registry: Self = toml::de::from_str(s)?;
        registry.validate()?;
        log::debug!(
            "Loaded statistic registry: {} statistics, {} primary",
            registry.statistics.len(),
            registry.primary.len()
        );
        Ok(registry)
    }

    /// Reads and validates a registry file.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self, StatisticError> {
        log::info!("Loading statistic registry from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), StatisticError> {
        for kind in &self.primary {
            if !self.statistics.contains_key(kind) {
                return Err(StatisticError::Invalid {
                    message: format!("primary statistic {kind} has no config"),
                });
            }
        }
        for (kind, config) in &self.statistics {
            if config.color.is_empty() {
                return Err(StatisticError::Invalid {
                    message: format!("{kind}: empty color"),
                });
            }
            let transform = config.map.as_ref().and_then(|map| map.transform);
            if let Some(Transform::Clamp { min, max }) = transform
                && min.partial_cmp(&max).is_none_or(std::cmp::Ordering::is_gt)
            {
                return Err(StatisticError::Invalid {
                    message: format!("{kind}: clamp bounds {min}..{max} are inverted"),
                });
            }
        }
        Ok(())
    }

    /// Configuration for a statistic, if registered.
    #[must_use]
    pub fn get(&self, kind: StatisticKind) -> Option<&StatisticConfig> {
        self.statistics.get(&kind)
    }

    /// Primary statistics, in configured order.
    #[must_use]
    pub fn primary(&self) -> &[StatisticKind] {
        &self.primary
    }

    /// All registered statistics with their configs.
    pub fn iter(&self) -> impl Iterator<Item = (StatisticKind, &StatisticConfig)> {
        self.statistics.iter().map(|(kind, config)| (*kind, config))
    }
}

#[cfg(test)]
mod tests {
    use covid_map_statistic_models::StatisticFormat;
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn loads_embedded_registry() {
        let registry = default_registry();
        for kind in StatisticKind::iter() {
            assert!(registry.get(kind).is_some(), "{kind} has no config");
        }
    }

    #[test]
    fn primary_statistics_are_fixed() {
        assert_eq!(
            default_registry().primary(),
            &[
                StatisticKind::Confirmed,
                StatisticKind::Recovered,
                StatisticKind::Deceased,
                StatisticKind::Tested,
            ]
        );
    }

    #[test]
    fn embedded_configs_have_expected_flags() {
        let registry = default_registry();
        let ratio = registry.get(StatisticKind::ActiveRatio).unwrap();
        assert!(ratio.non_linear);
        assert!(ratio.hide_zero);
        assert_eq!(ratio.format, StatisticFormat::Percent);

        let tested = registry.get(StatisticKind::Tested).unwrap();
        assert_eq!(tested.format, StatisticFormat::Short);
        assert!(!tested.non_linear);

        for (kind, config) in registry.iter() {
            assert!(
                config.color.starts_with('#'),
                "{kind}: color {} is not a hex colour",
                config.color
            );
            assert!(!config.display_name.is_empty(), "{kind}: empty display name");
        }
    }

    #[test]
    fn rejects_unconfigured_primary() {
        let err = StatisticRegistry::from_toml_str(
            r##"
            primary = ["confirmed", "tested"]

            [statistics.confirmed]
            display_name = "confirmed"
            color = "#ff073a"
            "##,
        )
        .unwrap_err();
        assert!(
            matches!(err, StatisticError::Invalid { ref message } if message.contains("tested")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_inverted_clamp() {
        let err = StatisticRegistry::from_toml_str(
            r##"
            primary = []

            [statistics.activeRatio]
            display_name = "active ratio"
            color = "#007bff"

            [statistics.activeRatio.map.transform]
            kind = "clamp"
            min = 10.0
            max = 1.0
            "##,
        )
        .unwrap_err();
        assert!(matches!(err, StatisticError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_statistic_key() {
        let result = StatisticRegistry::from_toml_str(
            r##"
            primary = []

            [statistics.hospitalised]
            display_name = "hospitalised"
            color = "#000000"
            "##,
        );
        assert!(matches!(result, Err(StatisticError::Toml(_))));
    }
}
