//! Best-effort chat alerts for status transitions.
//!
//! Alerts go to a bot-message API as plain text. Delivery is strictly
//! best effort: a rejected or failed send is logged with whatever the
//! endpoint returned and reported to the caller, never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use svitlowatch_watchdog::Alerter;
use tracing::error;

use crate::NotifyError;

/// Default bot API base.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Client for the bot `sendMessage` endpoint.
#[derive(Debug, Clone)]
pub struct AlertClient {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl AlertClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> AlertClientBuilder {
        AlertClientBuilder::default()
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    /// Assemble the alert text from its parts.
    pub fn compose(title: &str, duration_text: Option<&str>, reading_text: Option<&str>) -> String {
        let mut text = String::from(title);
        if let Some(duration) = duration_text {
            text.push_str("\nPrevious state lasted: ");
            text.push_str(duration);
        }
        if let Some(reading) = reading_text {
            text.push_str("\nCurrent reading: ");
            text.push_str(reading);
        }
        text
    }

    /// Send one message. Non-200 responses are reported with their body.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(self.send_url())
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "alert send failed");
                NotifyError::from(err)
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "alert rejected");
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Alerter for AlertClient {
    async fn notify(
        &self,
        title: &str,
        duration_text: Option<&str>,
        reading_text: Option<&str>,
    ) -> anyhow::Result<()> {
        let text = Self::compose(title, duration_text, reading_text);
        self.send(&text).await?;
        Ok(())
    }
}

/// Builder for [`AlertClient`].
#[derive(Debug, Default)]
pub struct AlertClientBuilder {
    api_base: Option<String>,
    token: Option<String>,
    chat_id: Option<String>,
    timeout: Option<Duration>,
}

impl AlertClientBuilder {
    /// Set the bot API base (default: the public API).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the bot token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the chat to deliver alerts to.
    pub fn chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Set the request timeout (default: 15 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> AlertClient {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        AlertClient {
            client,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            token: self.token.unwrap_or_default(),
            chat_id: self.chat_id.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let client = AlertClient::builder().build();
        assert_eq!(client.api_base, DEFAULT_API_BASE);
        assert_eq!(client.token, "");
        assert_eq!(client.chat_id, "");
    }

    #[test]
    fn send_url_embeds_the_token() {
        let client = AlertClient::builder()
            .api_base("http://localhost:8081")
            .token("123:abc")
            .chat_id("42")
            .build();

        assert_eq!(client.send_url(), "http://localhost:8081/bot123:abc/sendMessage");
    }

    #[test]
    fn compose_title_only() {
        assert_eq!(AlertClient::compose("Power lost", None, None), "Power lost");
    }

    #[test]
    fn compose_with_duration_and_reading() {
        let text = AlertClient::compose("Power restored", Some("1г 1хв 1с"), Some("230.4 В"));
        assert_eq!(
            text,
            "Power restored\nPrevious state lasted: 1г 1хв 1с\nCurrent reading: 230.4 В"
        );
    }

    #[test]
    fn compose_with_reading_only() {
        let text = AlertClient::compose("Watchdog started: power is on", None, Some("230.0 В"));
        assert_eq!(
            text,
            "Watchdog started: power is on\nCurrent reading: 230.0 В"
        );
    }

    #[test]
    fn payload_disables_link_previews() {
        let payload = SendMessage {
            chat_id: "42",
            text: "Power lost",
            disable_web_page_preview: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["text"], "Power lost");
        assert_eq!(json["disable_web_page_preview"], true);
    }
}
