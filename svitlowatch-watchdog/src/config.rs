//! Watchdog configuration.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default debounce before committing a status transition.
pub const DEFAULT_DEBOUNCE_SECS: u64 = 10;
/// Default staleness timeout after which a healthy-looking value is distrusted.
pub const DEFAULT_STALE_TIMEOUT_SECS: u64 = 90;
/// Default forced-refresh cadence for entities that do not push updates.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

const MAX_DEBOUNCE_SECS: u64 = 120;
const MAX_STALE_TIMEOUT_SECS: u64 = 3600;
const MAX_REFRESH_SECS: u64 = 600;

/// Errors from [`WatchdogConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The watched entity id was empty or whitespace.
    #[error("watched entity id must not be empty")]
    MissingEntity,

    /// A seconds field exceeded its allowed range.
    #[error("{field} must be at most {max} seconds, got {value}")]
    OutOfRange {
        field: &'static str,
        max: u64,
        value: u64,
    },
}

/// Configuration for one watchdog instance.
///
/// All timing fields are in whole seconds; a value of zero disables the
/// corresponding behavior (no debounce, no staleness check, no periodic
/// forced refresh).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Identifier of the entity to watch in the host state store.
    pub watched_entity_id: String,

    /// Monitoring channel key for heartbeat pings. Empty disables pings.
    pub channel_key: String,

    /// Bot token for the alert endpoint. Consumed by the embedding host
    /// when wiring an alert client; empty when alerting is not set up.
    pub bot_token: String,

    /// Chat identifier for the alert endpoint.
    pub chat_id: String,

    /// Seconds to wait before committing a detected status change.
    pub debounce_secs: u64,

    /// Seconds of silence after which an on reading is distrusted.
    pub stale_timeout_secs: u64,

    /// Seconds between forced refreshes of the watched entity.
    pub refresh_interval_secs: u64,

    /// Whether status-transition alerts are sent at all.
    pub alerts_enabled: bool,

    /// Whether to announce the initial status when the watchdog starts.
    pub notify_on_start: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            watched_entity_id: String::new(),
            channel_key: String::new(),
            bot_token: String::new(),
            chat_id: String::new(),
            debounce_secs: DEFAULT_DEBOUNCE_SECS,
            stale_timeout_secs: DEFAULT_STALE_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            alerts_enabled: true,
            notify_on_start: true,
        }
    }
}

impl WatchdogConfig {
    /// Default configuration watching the given entity.
    pub fn for_entity(entity_id: impl Into<String>) -> Self {
        Self {
            watched_entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    /// Check that all fields are within their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watched_entity_id.trim().is_empty() {
            return Err(ConfigError::MissingEntity);
        }
        check_range("debounce_secs", self.debounce_secs, MAX_DEBOUNCE_SECS)?;
        check_range("stale_timeout_secs", self.stale_timeout_secs, MAX_STALE_TIMEOUT_SECS)?;
        check_range("refresh_interval_secs", self.refresh_interval_secs, MAX_REFRESH_SECS)?;
        Ok(())
    }

    /// Debounce as a [`Duration`]; zero means commit immediately.
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    /// Staleness timeout as a [`Duration`]; zero disables the check.
    pub fn stale_timeout(&self) -> Duration {
        Duration::from_secs(self.stale_timeout_secs)
    }

    /// Forced-refresh cadence, or `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, max, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = WatchdogConfig::for_entity("sensor.voltage");
        assert_eq!(config.debounce_secs, 10);
        assert_eq!(config.stale_timeout_secs, 90);
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(config.alerts_enabled);
        assert!(config.notify_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_entity_is_rejected() {
        let config = WatchdogConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingEntity));

        let config = WatchdogConfig::for_entity("   ");
        assert_eq!(config.validate(), Err(ConfigError::MissingEntity));
    }

    #[test]
    fn debounce_range_is_enforced() {
        let mut config = WatchdogConfig::for_entity("sensor.voltage");
        config.debounce_secs = 120;
        assert!(config.validate().is_ok());

        config.debounce_secs = 121;
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "debounce_secs",
                max: 120,
                value: 121,
            })
        );
    }

    #[test]
    fn stale_timeout_range_is_enforced() {
        let mut config = WatchdogConfig::for_entity("sensor.voltage");
        config.stale_timeout_secs = 3600;
        assert!(config.validate().is_ok());

        config.stale_timeout_secs = 3601;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "stale_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn refresh_interval_range_is_enforced() {
        let mut config = WatchdogConfig::for_entity("sensor.voltage");
        config.refresh_interval_secs = 600;
        assert!(config.validate().is_ok());

        config.refresh_interval_secs = 601;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "refresh_interval_secs",
                ..
            })
        ));
    }

    #[test]
    fn zero_refresh_interval_disables_refresh() {
        let mut config = WatchdogConfig::for_entity("sensor.voltage");
        config.refresh_interval_secs = 0;
        assert_eq!(config.refresh_interval(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_applies_defaults() {
        let config: WatchdogConfig =
            serde_json::from_str(r#"{"watched_entity_id": "sensor.voltage", "debounce_secs": 3}"#)
                .unwrap();
        assert_eq!(config.watched_entity_id, "sensor.voltage");
        assert_eq!(config.debounce_secs, 3);
        assert_eq!(config.stale_timeout_secs, DEFAULT_STALE_TIMEOUT_SECS);
        assert!(config.alerts_enabled);
    }
}
