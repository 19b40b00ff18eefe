use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{SensorKind, SensorObservation};
use super::decoder::DecodeError;

/// Sensor event as broadcast on the wire
///
/// ```json
/// {"id": "sensor1", "epoch": 1700000000, "type": "temperature", "data": 20.0}
/// ```
///
/// `epoch` must be an unquoted integer that fits in a u32; serde_json
/// rejects strings, negatives, fractions and larger values for this field.
/// `data` must fit in an f32 without overflowing to infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEventRecord {
    /// Sensor identifier
    pub id: String,

    /// Seconds since the Unix epoch, UTC
    pub epoch: u32,

    /// Reading kind (`temperature`, `humidity`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Reading value in the kind's native unit
    #[serde(deserialize_with = "finite_f32")]
    pub data: f32,
}

/// Narrow a JSON number to f32, rejecting values outside its range
fn finite_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    let narrowed = value as f32;
    if narrowed.is_infinite() {
        return Err(D::Error::custom(format!("data {value} overflows f32")));
    }
    Ok(narrowed)
}

impl SensorEventRecord {
    pub fn new(id: impl Into<String>, epoch: u32, kind: &SensorKind, data: f32) -> Self {
        Self {
            id: id.into(),
            epoch,
            kind: kind.as_str().to_string(),
            data,
        }
    }

    /// Convert the wire record to a domain observation
    pub fn into_observation(self) -> Result<SensorObservation, DecodeError> {
        let timestamp = DateTime::<Utc>::from_timestamp(i64::from(self.epoch), 0)
            .ok_or(DecodeError::EpochOutOfRange(self.epoch))?;

        Ok(SensorObservation::new(
            self.id,
            timestamp,
            SensorKind::from(self.kind),
            self.data,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_type_field_name() {
        let record = SensorEventRecord::new("sensor1", 0, &SensorKind::Humidity, 40.0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"humidity\""));
        assert!(json.contains("\"epoch\":0"));
    }

    #[test]
    fn test_into_observation() {
        let record = SensorEventRecord {
            id: "sensor1".to_string(),
            epoch: 1_700_000_000,
            kind: "temperature".to_string(),
            data: 20.0,
        };
        let obs = record.into_observation().unwrap();
        assert_eq!(obs.id(), "sensor1");
        assert_eq!(obs.kind(), &SensorKind::Temperature);
        assert_eq!(obs.timestamp().timestamp(), 1_700_000_000);
        assert_eq!(obs.value(), 20.0);
    }
}
