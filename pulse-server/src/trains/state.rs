//! Train location state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unrecognised state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train state: {0}")]
pub struct InvalidState(String);

/// A train's relationship to the line at the moment it was observed.
///
/// This is a closed set. Supporting a new upstream phrasing means adding a
/// row to the location pattern table, not matching strings at call sites.
///
/// # Examples
///
/// ```
/// use pulse_server::trains::LocationState;
///
/// assert_eq!(LocationState::AtStation.to_string(), "AT_STATION");
/// assert_eq!("BETWEEN".parse::<LocationState>(), Ok(LocationState::Between));
/// assert!("SIDEWAYS".parse::<LocationState>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationState {
    /// Location text didn't match any known pattern
    #[default]
    Unknown,
    /// Stopped at a named station
    AtStation,
    /// Stopped at a platform; the text doesn't name the station
    AtPlatform,
    /// Running between two stations
    Between,
    /// Running in to the next station
    Approaching,
    /// Just left a station
    Departed,
}

impl LocationState {
    /// All states, in declaration order.
    pub const ALL: [LocationState; 6] = [
        LocationState::Unknown,
        LocationState::AtStation,
        LocationState::AtPlatform,
        LocationState::Between,
        LocationState::Approaching,
        LocationState::Departed,
    ];

    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationState::Unknown => "UNKNOWN",
            LocationState::AtStation => "AT_STATION",
            LocationState::AtPlatform => "AT_PLATFORM",
            LocationState::Between => "BETWEEN",
            LocationState::Approaching => "APPROACHING",
            LocationState::Departed => "DEPARTED",
        }
    }

    /// Whether a train in this state is no longer standing at a station.
    ///
    /// Departed counts: the text names the station just left, but the
    /// train is already running toward the next one. Approaching does not,
    /// since it carries no previous station.
    pub fn is_in_transit(&self) -> bool {
        matches!(self, LocationState::Between | LocationState::Departed)
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationState {
    type Err = InvalidState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| InvalidState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unknown() {
        assert_eq!(LocationState::default(), LocationState::Unknown);
    }

    #[test]
    fn display_matches_serde() {
        for state in LocationState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn parse_roundtrip() {
        for state in LocationState::ALL {
            assert_eq!(state.as_str().parse::<LocationState>(), Ok(state));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "at_station".parse::<LocationState>().unwrap_err();
        assert_eq!(err.to_string(), "invalid train state: at_station");
    }

    #[test]
    fn deserialize_rejects_unknown_names() {
        assert!(serde_json::from_str::<LocationState>("\"PARKED\"").is_err());
    }

    #[test]
    fn in_transit_states() {
        assert!(LocationState::Between.is_in_transit());
        assert!(LocationState::Departed.is_in_transit());
        assert!(!LocationState::Approaching.is_in_transit());
        assert!(!LocationState::AtStation.is_in_transit());
        assert!(!LocationState::AtPlatform.is_in_transit());
        assert!(!LocationState::Unknown.is_in_transit());
    }
}
