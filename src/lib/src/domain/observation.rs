use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{Display, Formatter};

/// Kind of a sensor reading, as named by the `type` field on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorKind {
    /// Degrees Celsius
    Temperature,
    /// Relative humidity in percent
    Humidity,
    /// Any other kind; decoded but never rendered
    Unrecognized(String),
}

impl From<&str> for SensorKind {
    fn from(value: &str) -> Self {
        match value {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for SensorKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            _ => Self::Unrecognized(value),
        }
    }
}

impl SensorKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl Display for SensorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded broadcast from a sensor node
///
/// The unit of `value` follows from `kind`: Celsius for temperature,
/// percent for humidity. Fields are private so an observation cannot be
/// changed after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorObservation {
    id: String,
    timestamp: DateTime<Utc>,
    kind: SensorKind,
    value: f32,
}

impl SensorObservation {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        kind: SensorKind,
        value: f32,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            kind,
            value,
        }
    }

    /// Sensor identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> &SensorKind {
        &self.kind
    }

    /// Raw value in the kind's native unit
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Timestamp rendered as RFC 3339 UTC at second precision
    pub fn timestamp_display(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
