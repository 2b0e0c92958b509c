//! TfL unified API client.
//!
//! Only the line arrivals endpoint is used. Each arrival is a prediction
//! of one vehicle reaching one station, so a single train shows up many
//! times in one response (once per station ahead of it).

mod client;
mod error;
mod fixture;
mod source;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_LINE, TflClient, TflConfig};
pub use error::TflError;
pub use fixture::FixtureClient;
pub use source::{PredictionSource, Upstream};
pub use types::Prediction;
