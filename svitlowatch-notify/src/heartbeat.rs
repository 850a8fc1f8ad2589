//! Fire-and-forget liveness ping to the monitoring channel.
//!
//! The monitoring service infers "power is on" from the mere arrival of
//! pings on a channel, so the request carries nothing but the channel key
//! and the response body is never interpreted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use svitlowatch_notify::HeartbeatClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = HeartbeatClient::builder()
//!         .channel_key("my-channel-key")
//!         .build();
//!
//!     // Best effort: a failure is logged and reported, nothing more.
//!     let _ = client.send().await;
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use svitlowatch_watchdog::Heartbeat;
use tracing::{debug, warn};

use crate::NotifyError;

/// Default monitoring endpoint.
pub const DEFAULT_PING_ENDPOINT: &str = "https://api.svitlobot.in.ua";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the `channelPing` liveness endpoint.
#[derive(Debug, Clone)]
pub struct HeartbeatClient {
    client: Client,
    endpoint: String,
    channel_key: String,
}

impl HeartbeatClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HeartbeatClientBuilder {
        HeartbeatClientBuilder::default()
    }

    fn ping_url(&self) -> String {
        format!(
            "{}/channelPing?channel_key={}",
            self.endpoint, self.channel_key
        )
    }

    /// Send one best-effort ping.
    ///
    /// HTTP statuses >= 400 are logged as warnings, transport failures at
    /// debug level; both come back as [`NotifyError`] for the caller.
    pub async fn send(&self) -> Result<(), NotifyError> {
        let response = self
            .client
            .get(self.ping_url())
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "channel ping failed");
                NotifyError::from(err)
            })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            warn!(%status, "channel ping rejected");
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Heartbeat for HeartbeatClient {
    async fn ping(&self) -> anyhow::Result<()> {
        self.send().await?;
        Ok(())
    }
}

/// Builder for [`HeartbeatClient`].
#[derive(Debug, Default)]
pub struct HeartbeatClientBuilder {
    endpoint: Option<String>,
    channel_key: Option<String>,
    timeout: Option<Duration>,
}

impl HeartbeatClientBuilder {
    /// Set the monitoring endpoint (default: the public service).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the channel key identifying this installation.
    pub fn channel_key(mut self, channel_key: impl Into<String>) -> Self {
        self.channel_key = Some(channel_key.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> HeartbeatClient {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        HeartbeatClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_PING_ENDPOINT.to_string()),
            channel_key: self.channel_key.unwrap_or_default(),
        }
    }
}
