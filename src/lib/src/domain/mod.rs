pub mod multicast;
pub mod observation;
pub mod units;

pub use observation::{SensorKind, SensorObservation};
