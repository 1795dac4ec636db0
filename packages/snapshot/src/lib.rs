#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Snapshot loading and polling.
//!
//! The dashboard reads one pre-aggregated JSON document per tick. This
//! crate fetches it from the data API (with retry and capped exponential
//! backoff) or from a local file, and republishes it on a fixed interval
//! through a [`tokio::sync::watch`] channel.

pub mod poller;
pub mod retry;
pub mod source;

use std::time::Duration;

use chrono::NaiveDate;
use covid_map_snapshot_models::Snapshot;

/// Default root of the data API.
pub const DEFAULT_DATA_API_ROOT: &str = "https://data.covid19india.org/v4/min";

/// Environment variable overriding [`DEFAULT_DATA_API_ROOT`].
pub const DATA_API_ROOT_ENV: &str = "COVID_MAP_DATA_API_ROOT";

/// How often the snapshot is re-fetched.
pub const API_REFRESH_INTERVAL: Duration = Duration::from_secs(100);

/// Errors that can occur while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading a local snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Request URL or other context.
        message: String,
    },

    /// Every retry attempt failed.
    #[error("Gave up after {attempts} attempts: {message}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last error.
        message: String,
    },
}

impl SnapshotError {
    /// Returns `true` if the error is likely transient and worth retrying.
    ///
    /// Truncated or garbled bodies count as transient, as do HTTP 429 and
    /// 5xx. Other 4xx statuses and local I/O errors are permanent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
            }
            Self::Json(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Io(_) | Self::Exhausted { .. } => false,
        }
    }
}

/// The data API root, from [`DATA_API_ROOT_ENV`] or the default.
#[must_use]
pub fn data_api_root() -> String {
    std::env::var(DATA_API_ROOT_ENV).unwrap_or_else(|_| DEFAULT_DATA_API_ROOT.to_string())
}

/// URL of the current snapshot, or of a dated historical one.
#[must_use]
pub fn snapshot_url(root: &str, date: Option<NaiveDate>) -> String {
    let root = root.trim_end_matches('/');
    date.map_or_else(
        || format!("{root}/data.min.json"),
        |date| format!("{root}/data-{}.min.json", date.format("%Y-%m-%d")),
    )
}

/// Parses a snapshot document.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if the document is not a JSON object of
/// region snapshots.
pub fn parse_snapshot(s: &str) -> Result<Snapshot, SnapshotError> {
    Ok(serde_json::from_str(s)?)
}
