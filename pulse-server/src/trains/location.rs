//! Location parsing.
//!
//! TfL describes where a train is with free text such as
//! "Between Warren Street and Oxford Circus" or "Left Green Park". The
//! phrasing is not a stable contract, so it is resolved into a
//! [`LocationState`] once, here, by an ordered pattern table.

use serde::{Deserialize, Serialize};

use super::state::LocationState;

/// Where a train is, derived from the upstream location text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Station the train is at or heading to.
    pub station_id: String,
    /// Station the train came from; empty when not meaningful.
    pub prev_station_id: String,
    /// True once the train is no longer standing at a station.
    pub is_between: bool,
    pub state: LocationState,
}

impl Location {
    fn new(state: LocationState, station: &str, prev_station: &str) -> Self {
        Self {
            station_id: station.to_string(),
            prev_station_id: prev_station.to_string(),
            is_between: state.is_in_transit(),
            state,
        }
    }
}

/// What a pattern row captures from the text after its prefix.
#[derive(Debug, Clone, Copy)]
enum Capture {
    /// "X and Y": previous X, current Y.
    Pair,
    /// A single station the train is at or heading to.
    Ahead,
    /// A single station the train has just left; it is both current and previous.
    Behind,
    /// Platform text only. The station comes from the prediction itself.
    Platform,
}

struct Pattern {
    prefix: &'static str,
    state: LocationState,
    capture: Capture,
}

/// Recognised phrasings. First match wins, so more specific prefixes must
/// come before the prefixes they extend ("At Platform" before "At ").
const PATTERNS: &[Pattern] = &[
    Pattern {
        prefix: "Between ",
        state: LocationState::Between,
        capture: Capture::Pair,
    },
    Pattern {
        prefix: "Approaching ",
        state: LocationState::Approaching,
        capture: Capture::Ahead,
    },
    Pattern {
        prefix: "Departed ",
        state: LocationState::Departed,
        capture: Capture::Behind,
    },
    Pattern {
        prefix: "Left ",
        state: LocationState::Departed,
        capture: Capture::Behind,
    },
    Pattern {
        prefix: "At Platform",
        state: LocationState::AtPlatform,
        capture: Capture::Platform,
    },
    Pattern {
        prefix: "Platform",
        state: LocationState::AtPlatform,
        capture: Capture::Platform,
    },
    Pattern {
        prefix: "At ",
        state: LocationState::AtStation,
        capture: Capture::Ahead,
    },
];

/// Derive a structured location from TfL's free-text description.
///
/// Never fails. Text that matches no pattern (including empty text) yields
/// [`LocationState::Unknown`] located at `fallback_station`, or at the raw
/// text when no fallback is given.
///
/// # Examples
///
/// ```
/// use pulse_server::trains::{LocationState, derive_location};
///
/// let loc = derive_location("Between Warren Street and Oxford Circus", "Oxford Circus");
/// assert_eq!(loc.state, LocationState::Between);
/// assert_eq!(loc.station_id, "Oxford Circus");
/// assert_eq!(loc.prev_station_id, "Warren Street");
/// assert!(loc.is_between);
///
/// let loc = derive_location("Near Euston", "Euston");
/// assert_eq!(loc.state, LocationState::Unknown);
/// assert_eq!(loc.station_id, "Euston");
/// ```
pub fn derive_location(raw: &str, fallback_station: &str) -> Location {
    let text = raw.trim();
    let fallback = match fallback_station.trim() {
        "" => text,
        name => name,
    };

    PATTERNS
        .iter()
        .find_map(|pattern| {
            let rest = text.strip_prefix(pattern.prefix)?;
            match_capture(pattern, rest, fallback)
        })
        .unwrap_or_else(|| Location::new(LocationState::Unknown, fallback, ""))
}

fn match_capture(pattern: &Pattern, rest: &str, fallback: &str) -> Option<Location> {
    match pattern.capture {
        Capture::Pair => {
            let (from, to) = rest.split_once(" and ")?;
            let from = non_empty(from)?;
            let to = non_empty(to)?;
            Some(Location::new(pattern.state, to, from))
        }
        Capture::Ahead => {
            let station = non_empty(rest)?;
            Some(Location::new(pattern.state, station, ""))
        }
        Capture::Behind => {
            let station = non_empty(rest)?;
            Some(Location::new(pattern.state, station, station))
        }
        Capture::Platform => Some(Location::new(pattern.state, fallback, "")),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Station-like names: capitalised words, never containing " and ".
    fn station_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,8}){0,2}"
            .prop_filter("must not look like a platform", |s| {
                !s.starts_with("Platform")
            })
    }

    proptest! {
        #[test]
        fn between_selects_approached_station(
            from in station_name(),
            to in station_name(),
            fallback in station_name(),
        ) {
            let loc = derive_location(&format!("Between {from} and {to}"), &fallback);
            prop_assert_eq!(loc.state, LocationState::Between);
            prop_assert_eq!(loc.station_id, to);
            prop_assert_eq!(loc.prev_station_id, from);
            prop_assert!(loc.is_between);
        }

        #[test]
        fn approaching_has_no_previous(x in station_name(), fallback in station_name()) {
            let loc = derive_location(&format!("Approaching {x}"), &fallback);
            prop_assert_eq!(loc.state, LocationState::Approaching);
            prop_assert_eq!(loc.station_id, x);
            prop_assert_eq!(loc.prev_station_id, "");
            prop_assert!(!loc.is_between);
        }

        #[test]
        fn left_and_departed_agree(
            verb in prop::sample::select(vec!["Left", "Departed"]),
            x in station_name(),
            fallback in station_name(),
        ) {
            let loc = derive_location(&format!("{verb} {x}"), &fallback);
            prop_assert_eq!(loc.state, LocationState::Departed);
            prop_assert_eq!(&loc.station_id, &x);
            prop_assert_eq!(&loc.prev_station_id, &x);
            prop_assert!(loc.is_between);
        }

        #[test]
        fn unrecognised_text_falls_back(text in "[a-z0-9 ]{0,30}", fallback in station_name()) {
            let loc = derive_location(&text, &fallback);
            prop_assert_eq!(loc.state, LocationState::Unknown);
            prop_assert_eq!(loc.station_id, fallback);
            prop_assert_eq!(loc.prev_station_id, "");
            prop_assert!(!loc.is_between);
        }

        /// is_between is a function of the state alone
        #[test]
        fn is_between_follows_state(text in ".{0,60}", fallback in ".{0,20}") {
            let loc = derive_location(&text, &fallback);
            prop_assert_eq!(loc.is_between, loc.state.is_in_transit());
        }
    }
}
