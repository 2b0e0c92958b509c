//! Fan-out of snapshots to live subscribers.
//!
//! Each subscriber is a bounded queue drained by its own connection task.
//! The hub serialises a snapshot once and offers it to every queue without
//! waiting; a queue that is closed or full is dropped from the set, which
//! in turn ends that subscriber's connection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};

use crate::poller::{Snapshot, SnapshotStore, UpdateSink};

/// Snapshots a subscriber may fall behind by before it is dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Why a payload could not be handed to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection side has gone away
    #[error("subscriber disconnected")]
    Closed,
    /// The connection isn't keeping up
    #[error("subscriber queue full")]
    Lagging,
}

/// A serialised snapshot, shared by every delivery of one broadcast.
#[derive(Debug, Clone)]
struct Payload {
    generation: u64,
    json: Arc<str>,
}

impl Payload {
    fn encode(snapshot: &Snapshot) -> Result<Self, serde_json::Error> {
        Ok(Self {
            generation: snapshot.generation,
            json: serde_json::to_string(snapshot)?.into(),
        })
    }
}

/// Sending half of one subscriber's queue.
#[derive(Debug)]
pub struct Subscriber {
    inner: Mutex<SubscriberInner>,
}

#[derive(Debug)]
struct SubscriberInner {
    tx: mpsc::Sender<Arc<str>>,
    /// Highest generation handed to this subscriber so far.
    delivered: Option<u64>,
}

impl Subscriber {
    /// Create a subscriber and the receiver its connection task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let subscriber = Self {
            inner: Mutex::new(SubscriberInner {
                tx,
                delivered: None,
            }),
        };
        (subscriber, rx)
    }

    /// Queue a payload without waiting.
    ///
    /// A payload older than one already delivered is skipped, so each
    /// subscriber sees snapshots in non-decreasing generation order.
    fn deliver(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if inner.delivered.is_some_and(|g| payload.generation < g) {
            return Ok(());
        }

        inner
            .tx
            .try_send(Arc::clone(&payload.json))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging,
                mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
            })?;

        inner.delivered = Some(payload.generation);
        Ok(())
    }
}

/// Hub-issued handle for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registered {
    id: u64,
    subscriber: Subscriber,
}

/// The set of live subscribers and the snapshot they are fed from.
pub struct Hub {
    store: SnapshotStore,
    subscribers: RwLock<Vec<Registered>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl Hub {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Register a subscriber and send it the current snapshot straight away.
    ///
    /// If that first delivery fails the subscriber is dropped again. After
    /// [`close_all`](Self::close_all) subscribers are dropped unregistered.
    pub async fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Registered before the initial send so a poll landing in between
        // still reaches it; the generation check discards whichever of the
        // two payloads turns out older.
        {
            let mut subscribers = self.subscribers.write().await;
            if self.closed.load(Ordering::Acquire) {
                debug!(subscriber = id, "hub closed, rejecting subscriber");
                return SubscriptionId(id);
            }
            subscribers.push(Registered { id, subscriber });
        }

        let Some(payload) = self.current_payload().await else {
            return SubscriptionId(id);
        };

        let result = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.subscriber.deliver(&payload))
        };

        match result {
            Some(Ok(())) => debug!(subscriber = id, "subscriber registered"),
            Some(Err(e)) => {
                warn!(subscriber = id, error = %e, "initial delivery failed, dropping subscriber");
                self.remove(&[id]).await;
            }
            // Already pruned by a concurrent broadcast.
            None => {}
        }

        SubscriptionId(id)
    }

    /// Remove a subscriber whose connection has closed.
    ///
    /// Removing an id that is already gone is a no-op.
    pub async fn unsubscribe(&self, id: SubscriptionId) {
        self.remove(&[id.0]).await;
        debug!(subscriber = id.0, "subscriber removed");
    }

    /// Drop every subscriber and refuse new ones.
    ///
    /// Dropping a subscriber closes its queue, which ends its connection
    /// task and lets it send a Close frame. Used at shutdown.
    pub async fn close_all(&self) {
        self.closed.store(true, Ordering::Release);
        let dropped = {
            let mut subscribers = self.subscribers.write().await;
            std::mem::take(&mut *subscribers)
        };
        info!(subscribers = dropped.len(), "closed all subscribers");
    }

    /// Send the current snapshot to every subscriber.
    ///
    /// Subscribers that can't take it are removed; the rest are unaffected.
    /// Nothing is reported to the caller.
    pub async fn broadcast_current(&self) {
        let Some(payload) = self.current_payload().await else {
            return;
        };

        let failed: Vec<u64> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .filter_map(|r| match r.subscriber.deliver(&payload) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(subscriber = r.id, error = %e, "dropping subscriber");
                        Some(r.id)
                    }
                })
                .collect()
        };

        if !failed.is_empty() {
            self.remove(&failed).await;
        }

        debug!(generation = payload.generation, "broadcast complete");
    }

    async fn current_payload(&self) -> Option<Payload> {
        let snapshot = self.store.current().await;
        match Payload::encode(&snapshot) {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!(error = %e, "failed to serialise snapshot");
                None
            }
        }
    }

    async fn remove(&self, ids: &[u64]) {
        self.subscribers
            .write()
            .await
            .retain(|r| !ids.contains(&r.id));
    }
}

impl UpdateSink for Hub {
    async fn snapshot_updated(&self) {
        self.broadcast_current().await;
    }
}
