//! # svitlowatch-watchdog
//!
//! A debounced, stale-aware power watchdog for a single sensor signal.
//!
//! The watchdog reads a raw voltage/connectivity reading from a host state
//! store, derives a stable boolean power status, and publishes immutable
//! snapshots to subscribers. Detected status changes are debounced through
//! a single cancellable pending task, silent signals are distrusted after
//! a staleness timeout, and offline entities are actively probed. Outbound
//! side effects (a rate-limited heartbeat ping, a transition alert) go
//! through the [`Heartbeat`] and [`Alerter`] collaborator traits;
//! `svitlowatch-notify` provides HTTP implementations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svitlowatch_watchdog::{MemoryStateStore, NoopNotifier, PowerWatchdog, WatchdogConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStateStore::new());
//!     store.set("sensor.kitchen_voltage", "230.4");
//!
//!     let config = WatchdogConfig::for_entity("sensor.kitchen_voltage");
//!     let notifier = Arc::new(NoopNotifier);
//!     let watchdog = PowerWatchdog::new(config, store.clone(), notifier.clone(), notifier)?;
//!
//!     let handle = watchdog.start();
//!     let mut updates = watchdog.subscribe_data();
//!
//!     // Feed readings in; the watchdog publishes on every status change.
//!     store.set("sensor.kitchen_voltage", "unavailable");
//!     while updates.changed().await.is_ok() {
//!         if let Some(data) = updates.borrow_and_update().clone() {
//!             println!("power_on={} voltage={:?}", data.power_on, data.voltage);
//!         }
//!     }
//!
//!     handle.stop();
//!     Ok(())
//! }
//! ```

mod classify;
mod config;
mod coordinator;
mod notify;
mod store;

pub use classify::{classify, parse_reading, ClassifiedReading, OFFLINE_MARKERS, POWER_ON_THRESHOLD};
pub use config::{
    ConfigError, WatchdogConfig, DEFAULT_DEBOUNCE_SECS, DEFAULT_REFRESH_SECS,
    DEFAULT_STALE_TIMEOUT_SECS,
};
pub use coordinator::{PowerWatchdog, WatchdogHandle};
pub use notify::{Alerter, Heartbeat, NoopNotifier};
pub use store::{MemoryStateStore, SignalState, StateChange, StateStore};

// Re-export the published snapshot type for convenience.
pub use svitlowatch_types::WatchdogData;
