use serde_json::Deserializer;
use thiserror::Error;

use crate::domain::SensorObservation;
use super::types::SensorEventRecord;

/// Errors decoding a single datagram; never fatal to the caller
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Empty payload")]
    Empty,

    #[error("Malformed sensor event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Epoch out of range: {0}")]
    EpochOutOfRange(u32),
}

/// Decode one datagram payload into an observation
///
/// Only the first JSON value is read. Bytes after it (NUL padding from a
/// sender's fixed buffer, for instance) are ignored.
pub fn decode(payload: &[u8]) -> Result<SensorObservation, DecodeError> {
    let mut records = Deserializer::from_slice(payload).into_iter::<SensorEventRecord>();

    match records.next() {
        Some(record) => record?.into_observation(),
        None => Err(DecodeError::Empty),
    }
}
