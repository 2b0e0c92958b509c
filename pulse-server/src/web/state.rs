//! Application state for the web layer.

use std::sync::Arc;

use crate::hub::Hub;
use crate::poller::SnapshotStore;
use crate::tfl::Upstream;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Prediction source, for on-demand passthrough queries
    pub upstream: Arc<Upstream>,

    /// Snapshot maintained by the poller
    pub snapshots: SnapshotStore,

    /// Live-update subscribers
    pub hub: Arc<Hub>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(upstream: Upstream, snapshots: SnapshotStore, hub: Arc<Hub>) -> Self {
        Self {
            upstream: Arc::new(upstream),
            snapshots,
            hub,
        }
    }
}
