//! Train position derivation.
//!
//! Turns a poll's raw predictions into one [`TrainInfo`] per vehicle,
//! resolving TfL's free-text location descriptions into a closed set of
//! [`LocationState`]s.

mod location;
mod snapshot;
mod state;

pub use location::{Location, derive_location};
pub use snapshot::{TrainInfo, TrainMap, build_train_map};
pub use state::{InvalidState, LocationState};

#[cfg(test)]
pub(crate) use snapshot::test_support;
