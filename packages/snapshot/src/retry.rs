//! Retry with capped exponential backoff.
//!
//! Every snapshot fetch goes through [`with_backoff`]: transient failures
//! (timeouts, connection resets, HTTP 429/5xx, truncated bodies) are
//! retried up to a fixed number of attempts, permanent ones fail at once.

use std::future::Future;
use std::time::Duration;

use covid_map_snapshot_models::Snapshot;

use crate::{SnapshotError, parse_snapshot};

/// Attempt count and delays for [`with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Five attempts, waiting 1s, 2s, 4s, 8s between them.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails permanently, or the policy's attempts
/// are used up.
///
/// # Errors
///
/// Returns the first non-transient error unchanged, or
/// [`SnapshotError::Exhausted`] carrying the last error once every attempt
/// has failed.
#[allow(clippy::future_not_send)]
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, SnapshotError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SnapshotError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= policy.max_attempts => {
                log::error!("Giving up after {attempt} attempts: {e}");
                return Err(SnapshotError::Exhausted {
                    attempts: attempt,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "  transient error: {e}; retry {attempt}/{} in {delay:?}...",
                    policy.max_attempts - 1
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// GETs a snapshot document and parses it, retrying per `policy`.
///
/// # Errors
///
/// Returns [`SnapshotError::Status`] for a permanent HTTP error status, or
/// [`SnapshotError::Exhausted`] when every attempt failed transiently.
pub async fn get_snapshot(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<Snapshot, SnapshotError> {
    with_backoff(policy, || async move {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SnapshotError::Status {
                status: status.as_u16(),
                message: url.to_string(),
            });
        }
        let text = response.text().await?;
        log::debug!("Fetched {} bytes from {url}", text.len());
        parse_snapshot(&text)
    })
    .await
}
