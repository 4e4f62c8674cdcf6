//! Atomically replaceable snapshot reference.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::index::{Snapshot, SnapshotSources};
use super::loader::load_snapshot;

/// Holds the published snapshot.
///
/// Readers take an `Arc<Snapshot>` at request start and keep a consistent
/// view for as long as they hold it; publishing swaps the reference and
/// the previous snapshot is dropped with its last reader.
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    path: PathBuf,
    sources: Arc<SnapshotSources>,
}

impl SnapshotStore {
    /// Loads the snapshot at `path` and publishes it.
    pub async fn open(path: impl Into<PathBuf>, sources: SnapshotSources) -> Result<Self> {
        let path = path.into();
        let sources = Arc::new(sources);
        let snapshot = load_snapshot(&path, Arc::clone(&sources)).await?;
        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
            path,
            sources,
        })
    }

    /// Wraps an already built snapshot.
    pub fn from_snapshot(
        snapshot: Snapshot,
        path: impl Into<PathBuf>,
        sources: SnapshotSources,
    ) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            path: path.into(),
            sources: Arc::new(sources),
        }
    }

    /// The currently published snapshot.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replaces the published snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuilds the snapshot from disk and publishes it.
    ///
    /// On failure the previous snapshot stays published.
    pub async fn reload(&self) -> Result<()> {
        log::info!("Reloading snapshot from {}", self.path.display());
        match load_snapshot(&self.path, Arc::clone(&self.sources)).await {
            Ok(snapshot) => {
                self.publish(snapshot);
                log::info!("Snapshot reloaded");
                Ok(())
            }
            Err(e) => {
                log::error!("Snapshot reload failed, keeping previous snapshot: {:#}", e);
                Err(e)
            }
        }
    }
}

/// Reloads the snapshot on every SIGHUP until `cancel` fires.
#[cfg(unix)]
pub fn spawn_hangup_reload(
    store: Arc<SnapshotStore>,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = hangups.recv() => {
                    if received.is_none() {
                        break;
                    }
                    log::info!("Received SIGHUP");
                    // Failure is logged by reload; the old snapshot keeps serving
                    let _ = store.reload().await;
                }
            }
        }
    }))
}

/// Signal-driven reload is unavailable; the task only waits for `cancel`.
#[cfg(not(unix))]
pub fn spawn_hangup_reload(
    _store: Arc<SnapshotStore>,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    log::warn!("SIGHUP reload is not supported on this platform");
    Ok(tokio::spawn(async move { cancel.cancelled().await }))
}
