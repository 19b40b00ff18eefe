use std::io::{self, Write};

use crate::domain::units::celsius_to_fahrenheit;
use crate::domain::{SensorKind, SensorObservation};

/// Render an observation as one output line
///
/// Returns `None` for kinds with no rendering.
pub fn render(observation: &SensorObservation) -> Option<String> {
    let line = match observation.kind() {
        SensorKind::Temperature => format!(
            "{}: ({}) Temperature: {:.2} *F",
            observation.timestamp_display(),
            observation.id(),
            celsius_to_fahrenheit(observation.value())
        ),
        SensorKind::Humidity => format!(
            "{}: ({}) Humidity: {:.2}%",
            observation.timestamp_display(),
            observation.id(),
            observation.value()
        ),
        SensorKind::Unrecognized(_) => return None,
    };

    Some(line)
}

/// Write the rendered line, if any, to `out`
///
/// Returns whether a line was written.
pub fn present<W: Write + ?Sized>(
    observation: &SensorObservation,
    out: &mut W,
) -> io::Result<bool> {
    match render(observation) {
        Some(line) => {
            writeln!(out, "{}", line)?;
            out.flush()?;
            Ok(true)
        }
        None => Ok(false),
    }
}
