//! Periodic snapshot refresh.
//!
//! The poller publishes the latest snapshot on a [`watch`] channel. Each
//! successful tick replaces the whole tree; a failed tick keeps the
//! previous (stale) snapshot. `None` means nothing has loaded yet.

use std::sync::Arc;
use std::time::Duration;

use covid_map_snapshot_models::Snapshot;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::source::SnapshotSource;

/// Latest published snapshot, `None` until the first successful fetch.
pub type LatestSnapshot = Option<Arc<Snapshot>>;

/// Re-fetches a snapshot on a fixed interval.
pub struct SnapshotPoller {
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    sender: watch::Sender<LatestSnapshot>,
}

impl SnapshotPoller {
    /// Creates a poller and the first receiver of its snapshots.
    #[must_use]
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        interval: Duration,
    ) -> (Self, watch::Receiver<LatestSnapshot>) {
        let (sender, receiver) = watch::channel(None);
        (
            Self {
                source,
                interval,
                sender,
            },
            receiver,
        )
    }

    /// Another receiver of the same snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LatestSnapshot> {
        self.sender.subscribe()
    }

    /// Fetches once and publishes on success. Returns whether a new
    /// snapshot was published.
    pub async fn tick(&self) -> bool {
        match self.source.fetch().await {
            Ok(snapshot) => {
                log::info!(
                    "Loaded snapshot with {} regions from {}",
                    snapshot.len(),
                    self.source.location()
                );
                self.sender.send_replace(Some(Arc::new(snapshot)));
                true
            }
            Err(e) => {
                let stale = self.sender.borrow().is_some();
                log::warn!(
                    "Snapshot refresh from {} failed: {e} ({})",
                    self.source.location(),
                    if stale {
                        "keeping stale snapshot"
                    } else {
                        "no data yet"
                    }
                );
                false
            }
        }
    }

    /// Polls until every receiver has been dropped. The first fetch
    /// happens immediately.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.tick().await;
            if self.sender.is_closed() {
                log::debug!("All snapshot receivers dropped, stopping poller");
                break;
            }
        }
    }
}
