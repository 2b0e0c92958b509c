//! The fetch capability the poller and web layer depend on.

use std::future::Future;

use super::error::TflError;
use super::types::Prediction;

/// Something that can produce the current set of arrival predictions.
///
/// Implemented by the live [`TflClient`](super::TflClient), the offline
/// [`FixtureClient`](super::FixtureClient), and test doubles.
pub trait PredictionSource: Send + Sync + 'static {
    /// Fetch every prediction currently known for the line.
    fn fetch_predictions(&self) -> impl Future<Output = Result<Vec<Prediction>, TflError>> + Send;
}

/// The prediction source the server runs against, picked at startup.
#[derive(Debug, Clone)]
pub enum Upstream {
    /// Live TfL API.
    Live(super::TflClient),
    /// Captured arrivals served from disk.
    Fixture(super::FixtureClient),
}

impl PredictionSource for Upstream {
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>, TflError> {
        match self {
            Upstream::Live(client) => client.fetch_predictions().await,
            Upstream::Fixture(client) => client.fetch_predictions().await,
        }
    }
}
