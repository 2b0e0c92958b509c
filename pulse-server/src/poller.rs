//! Background polling of TfL and ownership of the current snapshot.
//!
//! The poller fetches predictions on a fixed interval, rebuilds the train
//! map and swaps it in wholesale. Readers only ever see complete snapshots;
//! a failed fetch leaves the previous one in place.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::sync::{RwLock, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::tfl::{PredictionSource, TflError};
use crate::trains::{TrainMap, build_train_map};

/// Default time between polls. Ten requests a minute stays well inside
/// TfL's 500/minute allowance.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// One generation of train positions.
///
/// Immutable once built. Serialises as the bare vehicle → train mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Increments on every successful poll; 0 before the first one.
    pub generation: u64,
    /// When this snapshot was built. `None` before the first poll.
    pub updated_at: Option<DateTime<Utc>>,
    pub trains: TrainMap,
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.trains.serialize(serializer)
    }
}

/// Shared holder of the current snapshot.
///
/// Cloning is cheap and every clone sees the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding an empty generation-0 snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot. The returned view never changes underneath the caller.
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Swap in a new train map as the next generation.
    pub async fn replace(&self, trains: TrainMap) -> Arc<Snapshot> {
        let mut guard = self.current.write().await;
        let next = Arc::new(Snapshot {
            generation: guard.generation + 1,
            updated_at: Some(Utc::now()),
            trains,
        });
        *guard = Arc::clone(&next);
        next
    }
}

/// Receives a notification after each successful poll.
///
/// Passed to the [`Poller`] at construction so fan-out can push straight
/// away instead of waiting to be asked.
pub trait UpdateSink: Send + Sync + 'static {
    fn snapshot_updated(&self) -> impl Future<Output = ()> + Send;
}

/// No-op sink, for running the poller without subscribers.
impl UpdateSink for () {
    async fn snapshot_updated(&self) {}
}

impl<T: UpdateSink> UpdateSink for Arc<T> {
    async fn snapshot_updated(&self) {
        T::snapshot_updated(self).await
    }
}

/// Polls a prediction source and owns the resulting snapshot.
pub struct Poller<P, S = ()> {
    source: P,
    store: SnapshotStore,
    sink: S,
    interval: Duration,
}

impl<P: PredictionSource, S: UpdateSink> Poller<P, S> {
    /// Create a poller writing into `store` and notifying `sink`.
    pub fn new(source: P, store: SnapshotStore, sink: S, interval: Duration) -> Self {
        Self {
            source,
            store,
            sink,
            interval,
        }
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.store.current().await
    }

    /// Run one fetch → build → swap → notify cycle.
    ///
    /// On fetch failure the current snapshot is left untouched and the sink
    /// is not notified.
    pub async fn poll_once(&self) -> Result<Arc<Snapshot>, TflError> {
        let predictions = self.source.fetch_predictions().await?;
        let trains = build_train_map(&predictions);
        let snapshot = self.store.replace(trains).await;

        debug!(
            generation = snapshot.generation,
            predictions = predictions.len(),
            trains = snapshot.trains.len(),
            "snapshot updated"
        );

        self.sink.snapshot_updated().await;
        Ok(snapshot)
    }

    /// Poll until `shutdown` flips to true (or its sender is dropped).
    ///
    /// The first cycle runs immediately. Shutdown is only observed between
    /// cycles, never mid-fetch.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs_f64(), "starting poller");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, "poll failed, keeping previous snapshot");
                    }
                }
            }
        }

        info!("poller stopped");
    }
}
