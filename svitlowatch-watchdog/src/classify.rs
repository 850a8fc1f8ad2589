//! Status classification for raw sensor readings.
//!
//! A pure mapping from "whatever string the host state store holds" to a
//! boolean power status plus the parsed numeric value. The only context it
//! consumes is the age of the reading, for the staleness override.

use std::time::Duration;

/// Raw states meaning the upstream entity is not reporting a live value.
///
/// Matching is case-sensitive; these are host-level literals, not words.
pub const OFFLINE_MARKERS: [&str; 3] = ["unavailable", "unknown", "offline"];

/// Numeric readings at or above this value count as power on.
pub const POWER_ON_THRESHOLD: f64 = 200.0;

/// One classified evaluation of the watched signal.
///
/// Produced fresh on every evaluation and never stored; the coordinator
/// publishes a [`svitlowatch_types::WatchdogData`] snapshot derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedReading {
    /// Derived boolean status.
    pub power_on: bool,
    /// Raw state string, when the entity exists.
    pub state: Option<String>,
    /// Parsed numeric value, when the raw state was numeric.
    pub voltage: Option<f64>,
    /// Age of the reading relative to the last meaningful update.
    pub age: Option<Duration>,
}

/// Best-effort numeric parsing, tolerant of comma decimal separators.
pub fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn raw_power_on(raw: Option<&str>) -> (bool, Option<f64>) {
    let Some(raw) = raw else {
        return (false, None);
    };

    if OFFLINE_MARKERS.contains(&raw) {
        return (false, None);
    }

    match parse_reading(raw) {
        // An unparseable, non-offline state still counts as a live signal.
        None => (true, None),
        Some(v) => (v >= POWER_ON_THRESHOLD, Some(v)),
    }
}

/// Classify a raw reading together with its age.
///
/// `age` is the time since the signal last meaningfully changed; `None`
/// when unknown (entity absent, or a push event that is fresh by
/// definition). A reading that classifies as on is forced off when
/// `stale_timeout` is non-zero and `age` strictly exceeds it: silence is
/// treated as failure, never as success. A reading exactly at the timeout
/// is still considered fresh.
pub fn classify(raw: Option<&str>, age: Option<Duration>, stale_timeout: Duration) -> ClassifiedReading {
    let (mut power_on, voltage) = raw_power_on(raw);

    if power_on && !stale_timeout.is_zero() {
        if let Some(age) = age {
            if age > stale_timeout {
                power_on = false;
            }
        }
    }

    ClassifiedReading {
        power_on,
        state: raw.map(str::to_owned),
        voltage,
        age,
    }
}
