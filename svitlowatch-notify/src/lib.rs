//! # svitlowatch-notify
//!
//! Outbound HTTP notifiers for the svitlowatch power watchdog.
//!
//! Two clients, both fire-and-forget with bounded timeouts:
//!
//! - [`HeartbeatClient`] — GET liveness ping to a monitoring channel,
//!   implementing [`svitlowatch_watchdog::Heartbeat`].
//! - [`AlertClient`] — POST chat message on status transitions,
//!   implementing [`svitlowatch_watchdog::Alerter`].
//!
//! Neither client retries; the watchdog's own periodic cycle provides the
//! next natural attempt.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svitlowatch_notify::{AlertClient, HeartbeatClient};
//! use svitlowatch_watchdog::{MemoryStateStore, PowerWatchdog, WatchdogConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WatchdogConfig::for_entity("sensor.kitchen_voltage");
//!
//!     let heartbeat = HeartbeatClient::builder()
//!         .channel_key(config.channel_key.clone())
//!         .build();
//!     let alerter = AlertClient::builder()
//!         .token(config.bot_token.clone())
//!         .chat_id(config.chat_id.clone())
//!         .build();
//!
//!     let store = Arc::new(MemoryStateStore::new());
//!     let watchdog =
//!         PowerWatchdog::new(config, store, Arc::new(heartbeat), Arc::new(alerter))?;
//!     let _handle = watchdog.start();
//!     Ok(())
//! }
//! ```

mod alert;
mod error;
mod heartbeat;

pub use alert::{AlertClient, AlertClientBuilder, DEFAULT_API_BASE};
pub use error::NotifyError;
pub use heartbeat::{HeartbeatClient, HeartbeatClientBuilder, DEFAULT_PING_ENDPOINT};
