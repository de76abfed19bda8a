//! Versioned snapshot feed.

use log::debug;
use tokio::sync::watch;

use crate::error::Result;
use crate::grid::DataGrid;
use crate::grid::GridEvent;
use crate::store::Snapshot;

/// Publishing half of a snapshot feed.
///
/// Only the latest snapshot is retained; a slow subscriber skips
/// intermediate versions.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Snapshot>,
}

/// Receiving half of a snapshot feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    rx: watch::Receiver<Snapshot>,
}

/// Creates a feed. The initial empty snapshot at version 0 is treated as
/// already seen.
pub fn channel() -> (SnapshotPublisher, SnapshotFeed) {
    let (tx, rx) = watch::channel(Snapshot::default());
    (SnapshotPublisher { tx }, SnapshotFeed { rx })
}

impl SnapshotPublisher {
    /// Publish a snapshot, replacing any unread one.
    pub fn publish(&self, snapshot: Snapshot) {
        debug!(
            "Publishing snapshot v{} ({} rows)",
            snapshot.version,
            snapshot.rows.len()
        );
        self.tx.send_replace(snapshot);
    }

    /// Number of live subscribers.
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl SnapshotFeed {
    /// Waits for a snapshot newer than the last one seen.
    ///
    /// Returns `None` when the publisher is gone.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits for the next snapshot and applies it to `grid`.
    ///
    /// Stale versions are ignored by the grid; a snapshot that fails to
    /// build leaves the grid on its previous snapshot and returns the error.
    pub async fn apply_next(&mut self, grid: &mut DataGrid) -> Option<Result<Vec<GridEvent>>> {
        let snapshot = self.next().await?;
        Some(grid.apply_snapshot(snapshot))
    }
}
