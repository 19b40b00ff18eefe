pub mod decoder;
pub mod presenter;
pub mod types;

pub use decoder::{decode, DecodeError};
pub use types::SensorEventRecord;
