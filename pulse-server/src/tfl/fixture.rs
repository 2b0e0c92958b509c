//! Fixture client for running without TfL access.
//!
//! Serves a captured arrivals response from a JSON file as if it were a
//! live API response. The file is re-read on every fetch, so it can be
//! edited while the server runs.

use std::path::{Path, PathBuf};

use super::error::TflError;
use super::source::PredictionSource;
use super::types::Prediction;

/// Prediction source that serves data from a JSON file.
///
/// Useful for development and demos without a TfL app key.
#[derive(Debug, Clone)]
pub struct FixtureClient {
    path: PathBuf,
}

impl FixtureClient {
    /// Create a client for a file holding a JSON array of arrivals.
    ///
    /// The file is checked once here so a bad path fails at startup.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, TflError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| read_error(&path, e))?;
        parse(&path, &json)?;

        Ok(Self { path })
    }
}

impl PredictionSource for FixtureClient {
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>, TflError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| read_error(&self.path, e))?;
        parse(&self.path, &json)
    }
}

fn read_error(path: &Path, e: std::io::Error) -> TflError {
    TflError::Fixture {
        message: format!("failed to read {}: {}", path.display(), e),
    }
}

fn parse(path: &Path, json: &str) -> Result<Vec<Prediction>, TflError> {
    serde_json::from_str(json).map_err(|e| TflError::Fixture {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ARRIVALS: &str = r#"[
        {"vehicleId": "123", "stationName": "Victoria", "timeToStation": 120,
         "currentLocation": "At Victoria", "towards": "Walthamstow Central"},
        {"vehicleId": "456", "stationName": "Oxford Circus", "timeToStation": 240,
         "currentLocation": "Between Warren Street and Oxford Circus", "towards": "Brixton"}
    ]"#;

    #[tokio::test]
    async fn serves_fixture_predictions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arrivals.json");
        std::fs::write(&path, ARRIVALS).unwrap();

        let client = FixtureClient::new(&path).unwrap();
        let predictions = client.fetch_predictions().await.unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].vehicle_id, "123");
        assert_eq!(predictions[1].towards, "Brixton");
    }

    #[tokio::test]
    async fn bundled_fixture_builds_one_entry_per_train() {
        let client = FixtureClient::new("data/victoria_arrivals.json").unwrap();
        let predictions = client.fetch_predictions().await.unwrap();
        assert_eq!(predictions.len(), 6);

        let trains = crate::trains::build_train_map(&predictions);
        assert_eq!(trains.len(), 5);
        assert_eq!(trains["203"].time_to_next_seconds, 93);
        assert_eq!(trains["224"].location.station_id, "Brixton Underground Station");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = FixtureClient::new("/nonexistent/arrivals.json");
        assert!(matches!(result, Err(TflError::Fixture { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arrivals.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FixtureClient::new(&path),
            Err(TflError::Fixture { .. })
        ));
    }

    #[tokio::test]
    async fn edits_are_served_on_next_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arrivals.json");
        std::fs::write(&path, ARRIVALS).unwrap();
        let client = FixtureClient::new(&path).unwrap();

        std::fs::write(&path, "[]").unwrap();

        assert!(client.fetch_predictions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_broken_after_startup_fails_the_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arrivals.json");
        std::fs::write(&path, ARRIVALS).unwrap();
        let client = FixtureClient::new(&path).unwrap();

        std::fs::write(&path, "[{").unwrap();

        assert!(matches!(
            client.fetch_predictions().await,
            Err(TflError::Fixture { .. })
        ));
    }
}
