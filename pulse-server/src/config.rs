//! Server configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::tfl::{DEFAULT_BASE_URL, DEFAULT_LINE};

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Configuration errors. These are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// A variable is set but can't be parsed
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Where predictions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Live TfL API with the given app key.
    Live { api_key: String },
    /// A captured arrivals JSON file.
    Fixture { path: PathBuf },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    /// TfL line id
    pub line: String,
    /// TfL API base URL
    pub base_url: String,
    /// Time between polls
    pub poll_interval: Duration,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to read variables. Empty values count as unset.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TFL_API_KEY` | required unless `PULSE_FIXTURE_FILE` is set |
    /// | `PULSE_FIXTURE_FILE` | unset |
    /// | `TFL_LINE` | `victoria` |
    /// | `TFL_BASE_URL` | `https://api.tfl.gov.uk` |
    /// | `POLL_INTERVAL_SECS` | `6` |
    /// | `LISTEN_ADDR` | `127.0.0.1:8080` |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let source = match get("PULSE_FIXTURE_FILE") {
            Some(path) => SourceConfig::Fixture { path: path.into() },
            None => SourceConfig::Live {
                api_key: get("TFL_API_KEY").ok_or(ConfigError::Missing("TFL_API_KEY"))?,
            },
        };

        let poll_interval = match get("POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    var: "POLL_INTERVAL_SECS",
                    message: format!("{raw:?}: {e}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "POLL_INTERVAL_SECS",
                        message: "must be at least 1".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_POLL_INTERVAL,
        };

        let listen_raw = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::Invalid {
                var: "LISTEN_ADDR",
                message: format!("{listen_raw:?}: {e}"),
            })?;

        Ok(Self {
            source,
            line: get("TFL_LINE").unwrap_or_else(|| DEFAULT_LINE.to_string()),
            base_url: get("TFL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            poll_interval,
            listen_addr,
        })
    }
}
