//! Outbound notifier collaborator contracts.
//!
//! Concrete HTTP clients live in `svitlowatch-notify`; the coordinator
//! only sees these traits. Every call is a single best-effort attempt:
//! failures come back in the `Result` and the coordinator logs and moves
//! on, so implementations must never block indefinitely.

use async_trait::async_trait;

/// Liveness ping to an external monitoring channel.
#[async_trait]
pub trait Heartbeat: Send + Sync + 'static {
    /// Send one ping.
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Human-facing alert sink for status transitions.
#[async_trait]
pub trait Alerter: Send + Sync + 'static {
    /// Deliver an alert assembled from a title, the formatted duration of
    /// the previous status, and the current reading.
    async fn notify(
        &self,
        title: &str,
        duration_text: Option<&str>,
        reading_text: Option<&str>,
    ) -> anyhow::Result<()>;
}

/// Notifier that drops everything, for hosts with notifications disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Heartbeat for NoopNotifier {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Alerter for NoopNotifier {
    async fn notify(
        &self,
        _title: &str,
        _duration_text: Option<&str>,
        _reading_text: Option<&str>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
