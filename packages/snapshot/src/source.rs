//! Where snapshots come from.
//!
//! A [`SnapshotSource`] produces a whole [`Snapshot`] per call. The data API
//! is read through [`HttpSource`]; local dumps (tests, offline use) through
//! [`FileSource`].

use std::path::PathBuf;

use async_trait::async_trait;
use covid_map_snapshot_models::Snapshot;

use crate::retry::{RetryPolicy, get_snapshot};
use crate::{SnapshotError, parse_snapshot};

/// Trait implemented by every snapshot provider.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable location, for logs.
    fn location(&self) -> String;

    /// Loads a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the snapshot cannot be read or parsed.
    async fn fetch(&self) -> Result<Snapshot, SnapshotError>;
}

/// Snapshot served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    policy: RetryPolicy,
}

impl HttpSource {
    /// Creates a source with the default retry policy.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Snapshot, SnapshotError> {
        get_snapshot(&self.client, &self.url, &self.policy).await
    }
}

/// Snapshot read from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Snapshot, SnapshotError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_snapshot(&content)
    }
}
