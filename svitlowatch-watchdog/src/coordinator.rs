//! The watchdog coordinator: a debounced, stale-aware state machine.
//!
//! Two input streams feed the coordinator: state-change notifications from
//! the host store, and a fixed-period self-check ticker. Both funnel into
//! one spawned `tokio::select!` loop, so state is never mutated from two
//! places at once. Detected status changes are committed through a single
//! cancellable debounce task that re-reads the signal at commit time, and
//! the published snapshot is replaced atomically through a watch channel.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use svitlowatch_types::{format_duration, WatchdogData};

use crate::classify::{classify, ClassifiedReading};
use crate::config::{ConfigError, WatchdogConfig};
use crate::notify::{Alerter, Heartbeat};
use crate::store::{StateChange, StateStore};

/// How often the periodic self-check runs.
const CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Minimum spacing between non-forced heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(65);

/// Probe cadence while the published status is off.
const PROBE_INTERVAL: Duration = Duration::from_secs(20);

/// Whether to actively probe the entity while offline.
const PROBE_WHEN_OFFLINE: bool = true;

/// What prompted a candidate transition; feeds the alert title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionReason {
    /// A pushed state-change event.
    Push,
    /// The periodic check saw recovery while probing an offline entity.
    ProbeRecovered,
    /// The periodic check distrusted a silent signal.
    StaleTimeout,
    /// The periodic check found a divergence with no better explanation.
    Periodic,
}

struct PendingTransition {
    target: bool,
    task: JoinHandle<()>,
}

struct WatchdogState {
    last_meaningful_update: Instant,
    status_since: Option<Instant>,
    last_heartbeat: Option<Instant>,
    last_probe: Option<Instant>,
    last_refresh: Option<Instant>,
    pending: Option<PendingTransition>,
}

struct Inner {
    config: WatchdogConfig,
    store: Arc<dyn StateStore>,
    heartbeat: Arc<dyn Heartbeat>,
    alerter: Arc<dyn Alerter>,
    state: Mutex<WatchdogState>,
    data_tx: watch::Sender<Option<WatchdogData>>,
    periodic_lock: tokio::sync::Mutex<()>,
}

/// Watchdog for a single watched entity.
///
/// Create with [`PowerWatchdog::new`], then call [`PowerWatchdog::start`]
/// from within a Tokio runtime. Published snapshots are available through
/// [`PowerWatchdog::data`] and [`PowerWatchdog::subscribe_data`].
///
/// `start` is meant to be called once per instance.
pub struct PowerWatchdog {
    inner: Arc<Inner>,
}

/// Stop handle returned by [`PowerWatchdog::start`].
pub struct WatchdogHandle {
    inner: Arc<Inner>,
    stop_tx: watch::Sender<bool>,
}

impl PowerWatchdog {
    /// Build a watchdog from a validated configuration and collaborators.
    pub fn new(
        config: WatchdogConfig,
        store: Arc<dyn StateStore>,
        heartbeat: Arc<dyn Heartbeat>,
        alerter: Arc<dyn Alerter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (data_tx, _) = watch::channel(None);
        let inner = Arc::new(Inner {
            config,
            store,
            heartbeat,
            alerter,
            state: Mutex::new(WatchdogState {
                last_meaningful_update: Instant::now(),
                status_since: None,
                last_heartbeat: None,
                last_probe: None,
                last_refresh: None,
                pending: None,
            }),
            data_tx,
            periodic_lock: tokio::sync::Mutex::new(()),
        });

        Ok(Self { inner })
    }

    /// The configuration this watchdog was built with.
    pub fn config(&self) -> &WatchdogConfig {
        &self.inner.config
    }

    /// The most recently published snapshot, `None` before the first one.
    pub fn data(&self) -> Option<WatchdogData> {
        self.inner.data_tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe_data(&self) -> watch::Receiver<Option<WatchdogData>> {
        self.inner.data_tx.subscribe()
    }

    /// Evaluate and publish the initial status, then spawn the run loop.
    ///
    /// The initial publish is synchronous and undebounced. Staleness is
    /// seeded from the signal's own change time, not from "now", so the
    /// very first periodic check already computes a correct age. If the
    /// initial status is on, the heartbeat fires immediately.
    pub fn start(&self) -> WatchdogHandle {
        let inner = self.inner.clone();
        let entity = inner.config.watched_entity_id.clone();

        // Subscribe before the initial read so nothing slips between them.
        let mut events = inner.store.subscribe(&entity);

        {
            let mut st = inner.state.lock();
            st.last_meaningful_update = inner
                .store
                .get(&entity)
                .map(|s| s.last_changed)
                .unwrap_or_else(Instant::now);
        }

        let reading = inner.evaluate();
        let data = inner.snapshot(&reading);
        let reading_text = data.reading_text();
        info!(
            entity = %entity,
            power_on = reading.power_on,
            "watchdog started"
        );
        {
            let mut st = inner.state.lock();
            st.status_since = Some(Instant::now());
            inner.data_tx.send_replace(Some(data));
        }

        if reading.power_on {
            inner.fire_heartbeat(true);
        }

        if inner.config.alerts_enabled && inner.config.notify_on_start {
            let title = if reading.power_on {
                "Watchdog started: power is on"
            } else {
                "Watchdog started: power is off"
            };
            inner.send_alert(title.to_string(), None, reading_text);
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let loop_inner = inner.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + CHECK_INTERVAL, CHECK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(change) => handle_state_change(&loop_inner, change),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "state-change subscription lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = ticker.tick() => {
                        let periodic = loop_inner.clone();
                        tokio::spawn(async move { periodic_check(periodic).await });
                    }
                    changed = stop_rx.changed() => match changed {
                        Ok(()) if !*stop_rx.borrow() => continue,
                        _ => break,
                    },
                }
            }
        });

        WatchdogHandle {
            inner: self.inner.clone(),
            stop_tx,
        }
    }
}

impl WatchdogHandle {
    /// Stop the run loop and cancel any pending transition. Idempotent.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
        if let Some(pending) = self.inner.state.lock().pending.take() {
            pending.task.abort();
        }
    }
}

impl Inner {
    /// Read the signal and classify it with its current age.
    fn evaluate(&self) -> ClassifiedReading {
        let signal = self.store.get(&self.config.watched_entity_id);
        let age = signal
            .as_ref()
            .map(|_| self.state.lock().last_meaningful_update.elapsed());
        classify(
            signal.as_ref().map(|s| s.value.as_str()),
            age,
            self.config.stale_timeout(),
        )
    }

    fn snapshot(&self, reading: &ClassifiedReading) -> WatchdogData {
        let mut data = WatchdogData::new(reading.power_on, self.config.watched_entity_id.clone());
        if let Some(state) = &reading.state {
            data = data.with_reading(state.clone(), reading.voltage);
        }
        data
    }

    /// Publish a value-only update when the reading moved within the same
    /// status. Never touches `status_since`, never fires notifiers.
    fn refresh_in_place(&self, current: &WatchdogData, reading: &ClassifiedReading) {
        if current.state.as_deref() != reading.state.as_deref() || current.voltage != reading.voltage
        {
            self.data_tx.send_replace(Some(self.snapshot(reading)));
        }
    }

    /// Ping the monitoring channel, rate-limited unless `force`.
    ///
    /// Forced pings (startup-while-on, a fresh transition to on) bypass
    /// the limit but still rearm it. The send itself is fire-and-forget.
    fn fire_heartbeat(&self, force: bool) {
        if self.config.channel_key.trim().is_empty() {
            return;
        }

        {
            let mut st = self.state.lock();
            if !force {
                if let Some(last) = st.last_heartbeat {
                    if last.elapsed() < HEARTBEAT_INTERVAL {
                        return;
                    }
                }
            }
            st.last_heartbeat = Some(Instant::now());
        }

        let heartbeat = self.heartbeat.clone();
        tokio::spawn(async move {
            if let Err(err) = heartbeat.ping().await {
                debug!(error = %err, "heartbeat ping failed");
            }
        });
    }

    /// Fire-and-forget alert delivery. Callers check `alerts_enabled`.
    fn send_alert(
        &self,
        title: String,
        duration_text: Option<String>,
        reading_text: Option<String>,
    ) {
        let alerter = self.alerter.clone();
        tokio::spawn(async move {
            if let Err(err) = alerter
                .notify(&title, duration_text.as_deref(), reading_text.as_deref())
                .await
            {
                warn!(error = %err, "alert delivery failed");
            }
        });
    }
}

/// React to a pushed state-change notification. Never awaits: a burst of
/// flapping can only ever schedule work, not stall the event loop.
fn handle_state_change(inner: &Arc<Inner>, change: StateChange) {
    if change.entity_id != inner.config.watched_entity_id {
        return;
    }

    {
        let mut st = inner.state.lock();
        let meaningful = match (&change.old, &change.new) {
            (Some(old), Some(new)) => {
                old.value != new.value || old.last_reported != new.last_reported
            }
            _ => true,
        };
        if meaningful {
            st.last_meaningful_update = Instant::now();
        }
    }

    // A pushed value is fresh by definition; staleness does not apply here.
    let raw = change.new.as_ref().map(|s| s.value.as_str());
    let reading = classify(raw, None, Duration::ZERO);

    match inner.data_tx.borrow().clone() {
        Some(current) if current.power_on == reading.power_on => {
            inner.refresh_in_place(&current, &reading);
        }
        _ => schedule_transition(inner, reading.power_on, TransitionReason::Push),
    }
}

/// The periodic self-check. Serialized on its own async lock so a slow
/// forced refresh cannot interleave two ticks.
async fn periodic_check(inner: Arc<Inner>) {
    let _serial = inner.periodic_lock.lock().await;

    let entity = inner.config.watched_entity_id.clone();
    let current = inner.data_tx.borrow().clone();

    if current.as_ref().is_some_and(|d| d.power_on) {
        inner.fire_heartbeat(false);
    }

    if PROBE_WHEN_OFFLINE && current.as_ref().is_some_and(|d| !d.power_on) {
        let due = {
            let mut st = inner.state.lock();
            let due = st.last_probe.map_or(true, |t| t.elapsed() >= PROBE_INTERVAL);
            if due {
                st.last_probe = Some(Instant::now());
            }
            due
        };
        if due {
            if let Err(err) = inner.store.request_refresh(&entity).await {
                warn!(entity = %entity, error = %err, "offline probe refresh failed");
            }
        }
    }

    if let Some(every) = inner.config.refresh_interval() {
        let due = {
            let mut st = inner.state.lock();
            let due = st.last_refresh.map_or(true, |t| t.elapsed() >= every);
            if due {
                st.last_refresh = Some(Instant::now());
            }
            due
        };
        if due {
            if let Err(err) = inner.store.request_refresh(&entity).await {
                warn!(entity = %entity, error = %err, "periodic forced refresh failed");
            }
        }
    }

    let reading = inner.evaluate();
    // Startup race: nothing published yet, nothing to correct.
    let Some(current) = inner.data_tx.borrow().clone() else {
        return;
    };

    if current.power_on == reading.power_on {
        inner.refresh_in_place(&current, &reading);
        return;
    }

    let reason = if reading.power_on {
        if PROBE_WHEN_OFFLINE {
            TransitionReason::ProbeRecovered
        } else {
            TransitionReason::Periodic
        }
    } else if classify(reading.state.as_deref(), None, Duration::ZERO).power_on {
        // The raw value still looks healthy; only silence argues otherwise.
        TransitionReason::StaleTimeout
    } else {
        TransitionReason::Periodic
    };

    schedule_transition(&inner, reading.power_on, reason);
}

/// Register a candidate transition in the single pending slot.
///
/// A live pending task toward the same target is left untouched, so the
/// debounce window keeps its original start and repeated candidates are
/// idempotent. A pending task toward a different target is superseded:
/// it is aborted before the replacement is spawned, keeping at most one
/// pending transition alive.
fn schedule_transition(inner: &Arc<Inner>, target: bool, reason: TransitionReason) {
    let mut st = inner.state.lock();

    if let Some(pending) = &st.pending {
        if pending.target == target && !pending.task.is_finished() {
            return;
        }
    }
    if let Some(previous) = st.pending.take() {
        previous.task.abort();
    }

    debug!(power_on = target, ?reason, "scheduling debounced transition");
    let task = tokio::spawn(debounced_commit(inner.clone(), target, reason));
    st.pending = Some(PendingTransition { target, task });
}

/// Body of the pending-transition task.
///
/// Cancellation can only land at the debounce sleep; everything after the
/// commit-time re-read is synchronous, so an aborted task has performed no
/// side effects and a committing task always finishes its publish.
async fn debounced_commit(inner: Arc<Inner>, target: bool, reason: TransitionReason) {
    let debounce = inner.config.debounce();
    if !debounce.is_zero() {
        time::sleep(debounce).await;
    }

    // Re-read at commit time: the signal may have moved during the wait.
    let reading = inner.evaluate();
    if reading.power_on != target {
        return;
    }

    let data = inner.snapshot(&reading);
    let reading_text = data.reading_text();

    let previous = {
        let mut st = inner.state.lock();
        let current = inner.data_tx.borrow().clone();
        if let Some(current) = &current {
            if current.power_on == target {
                // Crossed events: the published status already matches.
                drop(st);
                inner.refresh_in_place(current, &reading);
                return;
            }
        }
        let previous = st.status_since.map(|t| t.elapsed());
        st.status_since = Some(Instant::now());
        inner.data_tx.send_replace(Some(data));
        previous
    };

    info!(
        entity = %inner.config.watched_entity_id,
        power_on = target,
        ?reason,
        previous_secs = previous.map(|d| d.as_secs()),
        "status transition committed"
    );

    if target {
        inner.fire_heartbeat(true);
    }

    if inner.config.alerts_enabled {
        inner.send_alert(
            transition_title(target, reason),
            previous.map(format_duration),
            reading_text,
        );
    }
}

fn transition_title(power_on: bool, reason: TransitionReason) -> String {
    let base = if power_on { "Power restored" } else { "Power lost" };
    match reason {
        TransitionReason::Push => base.to_string(),
        TransitionReason::ProbeRecovered => format!("{base} (probe recovered)"),
        TransitionReason::StaleTimeout => format!("{base} (stale timeout)"),
        TransitionReason::Periodic => format!("{base} (periodic check)"),
    }
}
