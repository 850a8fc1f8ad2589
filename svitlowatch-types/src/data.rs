//! The published watchdog snapshot.

/// The externally visible result of one watchdog evaluation.
///
/// A new instance replaces the previous one atomically on every publish;
/// consumers hold the latest snapshot and are notified on replacement.
/// The snapshot never mutates in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatchdogData {
    /// The derived boolean status: is the watched signal considered live.
    pub power_on: bool,

    /// Identifier of the entity this snapshot was derived from.
    pub watched_entity_id: String,

    /// Raw state string as last seen in the host state store.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub state: Option<String>,

    /// Parsed numeric value, when the raw state was numeric.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub voltage: Option<f64>,
}

impl WatchdogData {
    /// Create a snapshot with no reading attached.
    pub fn new(power_on: bool, watched_entity_id: impl Into<String>) -> Self {
        Self {
            power_on,
            watched_entity_id: watched_entity_id.into(),
            state: None,
            voltage: None,
        }
    }

    /// Attach the raw state string and parsed value.
    pub fn with_reading(mut self, state: impl Into<String>, voltage: Option<f64>) -> Self {
        self.state = Some(state.into());
        self.voltage = voltage;
        self
    }

    /// Human-readable current reading, for notification text.
    ///
    /// Prefers the parsed voltage ("230.4 В"), falls back to the raw state.
    pub fn reading_text(&self) -> Option<String> {
        match self.voltage {
            Some(v) => Some(format!("{v:.1} В")),
            None => self.state.clone(),
        }
    }
}
