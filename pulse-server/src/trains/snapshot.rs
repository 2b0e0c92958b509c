//! Building the per-vehicle train map from a poll's predictions.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use crate::tfl::Prediction;

use super::location::{Location, derive_location};

/// Best known position of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainInfo {
    pub location: Location,
    /// Destination text as published by TfL, e.g. "Brixton".
    pub direction: String,
    /// Seconds until the train reaches the next station.
    pub time_to_next_seconds: i64,
}

/// Vehicle id → train info. Ordered so serialised output is stable.
pub type TrainMap = BTreeMap<String, TrainInfo>;

/// Build the train map for one poll.
///
/// TfL reports each train once per station ahead of it. The prediction
/// with the smallest time-to-station is the nearest, and so freshest,
/// signal for where the train is now. Ties go to whichever came first.
///
/// Vehicle ids and time values are taken as-is, empty ids and negative
/// times included.
pub fn build_train_map(predictions: &[Prediction]) -> TrainMap {
    let mut nearest: BTreeMap<&str, &Prediction> = BTreeMap::new();

    for prediction in predictions {
        match nearest.entry(prediction.vehicle_id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(prediction);
            }
            Entry::Occupied(mut slot) => {
                if prediction.time_to_station < slot.get().time_to_station {
                    slot.insert(prediction);
                }
            }
        }
    }

    nearest
        .into_iter()
        .map(|(vehicle_id, p)| (vehicle_id.to_string(), train_info(p)))
        .collect()
}

fn train_info(prediction: &Prediction) -> TrainInfo {
    TrainInfo {
        location: derive_location(&prediction.current_location, &prediction.station_name),
        direction: prediction.towards.clone(),
        time_to_next_seconds: prediction.time_to_station,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::tfl::Prediction;

    /// A prediction with the fields the builder reads.
    pub fn prediction(vehicle: &str, location: &str, towards: &str, time: i64) -> Prediction {
        Prediction {
            vehicle_id: vehicle.to_string(),
            station_name: String::new(),
            current_location: location.to_string(),
            towards: towards.to_string(),
            time_to_station: time,
            ..Default::default()
        }
    }
}
