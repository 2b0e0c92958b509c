//! TfL unified API HTTP client.
//!
//! Fetches live arrival predictions for one line. Handles the app key,
//! the mandatory User-Agent header and status-code mapping.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use super::error::TflError;
use super::source::PredictionSource;
use super::types::Prediction;

/// Default base URL for the TfL unified API.
pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Default line to track.
pub const DEFAULT_LINE: &str = "victoria";

/// TfL answers 403 to requests without a User-Agent.
const USER_AGENT_VALUE: &str = concat!("pulse-server/", env!("CARGO_PKG_VERSION"));

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    /// Application key sent as the `app_key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production TfL)
    pub base_url: String,
    /// Line identifier, e.g. "victoria"
    pub line: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TflConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            line: DEFAULT_LINE.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the line to fetch arrivals for.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// URL of the arrivals endpoint for the configured line.
    pub fn arrivals_url(&self) -> String {
        format!(
            "{}/Line/{}/Arrivals",
            self.base_url.trim_end_matches('/'),
            self.line
        )
    }
}

/// TfL arrivals API client.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl TflClient {
    /// Create a new TfL client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, TflError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.arrivals_url(),
            api_key: config.api_key,
        })
    }

    /// Get every arrival prediction currently published for the line.
    pub async fn get_arrivals(&self) -> Result<Vec<Prediction>, TflError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("app_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TflError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TflError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TflError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TflError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl PredictionSource for TflClient {
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>, TflError> {
        self.get_arrivals().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = TflConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_line("northern")
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.line, "northern");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = TflConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.line, DEFAULT_LINE);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn arrivals_url_tolerates_trailing_slash() {
        let config = TflConfig::new("k").with_base_url("http://localhost:9000/");
        assert_eq!(
            config.arrivals_url(),
            "http://localhost:9000/Line/victoria/Arrivals"
        );
    }

    #[test]
    fn client_creation() {
        let client = TflClient::new(TflConfig::new("test-key"));
        assert!(client.is_ok());
    }
}
