//! Data transfer objects for web responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Diagnostics about the poller and hub.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Snapshot generation; 0 until the first successful poll
    pub generation: u64,

    /// When the current snapshot was built
    pub updated_at: Option<DateTime<Utc>>,

    /// Vehicles in the current snapshot
    pub train_count: usize,

    /// Connected live-update subscribers
    pub subscribers: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
