#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistic resolution, normalisation and formatting.
//!
//! Turns a region's snapshot into presentation-ready numbers: derived
//! statistics (active cases, active ratio), 7-day moving averages,
//! per-capita normalisation, and Indian-system number abbreviations.
//! Everything here is a pure function over immutable inputs; the only
//! shared state is the read-only [`registry::StatisticRegistry`] built
//! once at startup.

pub mod dates;
pub mod district;
pub mod format;
pub mod registry;
pub mod resolve;

pub use district::{has_no_district_data, no_district_data_regions};
pub use format::{NumberFormatter, NumberLocale, abbreviate_number, format_number};
pub use registry::{StatisticRegistry, default_registry};
pub use resolve::{resolve, resolve_with};

use thiserror::Error;

/// Errors that can occur while loading statistic configuration.
#[derive(Debug, Error)]
pub enum StatisticError {
    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading a registry file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry parsed but is inconsistent.
    #[error("Invalid statistic registry: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}
