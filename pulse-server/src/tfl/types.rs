//! TfL arrivals API DTOs.
//!
//! These map directly onto the `Line/{id}/Arrivals` JSON. TfL sends many
//! more fields than we use; unknown fields are ignored. Fields we do use
//! default when absent because the feed is not consistent about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One arrival prediction: a vehicle expected at a station.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prediction {
    /// Stable identifier of the physical train.
    pub vehicle_id: String,

    /// Station this prediction is for.
    pub station_name: String,

    /// Platform at that station, e.g. "Northbound - Platform 1".
    pub platform_name: String,

    /// Seconds until the vehicle reaches `station_name`.
    pub time_to_station: i64,

    /// Free-text position, e.g. "Between Warren Street and Oxford Circus".
    pub current_location: String,

    /// Destination description.
    pub towards: String,

    /// When TfL generated this prediction.
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_tfl_arrival() {
        let json = r#"{
            "$type": "Tfl.Api.Presentation.Entities.Prediction, Tfl.Api.Presentation.Entities",
            "id": "-1392183468",
            "operationType": 1,
            "vehicleId": "203",
            "naptanId": "940GZZLUOXC",
            "stationName": "Oxford Circus Underground Station",
            "lineId": "victoria",
            "platformName": "Southbound - Platform 5",
            "timestamp": "2024-11-20T18:41:05.4170425Z",
            "timeToStation": 93,
            "currentLocation": "Between Warren Street and Oxford Circus",
            "towards": "Brixton",
            "expectedArrival": "2024-11-20T18:42:38Z"
        }"#;

        let p: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(p.vehicle_id, "203");
        assert_eq!(p.station_name, "Oxford Circus Underground Station");
        assert_eq!(p.platform_name, "Southbound - Platform 5");
        assert_eq!(p.time_to_station, 93);
        assert_eq!(p.current_location, "Between Warren Street and Oxford Circus");
        assert_eq!(p.towards, "Brixton");
        assert!(p.timestamp.is_some());
    }

    #[test]
    fn missing_fields_default() {
        let p: Prediction = serde_json::from_str(r#"{"vehicleId": "7"}"#).unwrap();
        assert_eq!(p.vehicle_id, "7");
        assert_eq!(p.time_to_station, 0);
        assert!(p.current_location.is_empty());
        assert!(p.timestamp.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let p = Prediction {
            vehicle_id: "1".into(),
            time_to_station: 30,
            ..Default::default()
        };
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["vehicleId"], "1");
        assert_eq!(value["timeToStation"], 30);
    }
}
