//! Host state-store collaborator contract, plus an in-memory implementation.
//!
//! The watchdog never owns the signal it watches; it reads it from a host
//! state store and subscribes to change notifications. The trait here is
//! that boundary. [`MemoryStateStore`] is a complete implementation for
//! tests and for hosts that feed readings in directly.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Raw state of a watched entity as held by the host state store.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalState {
    /// Raw state string reported by the sensor.
    pub value: String,
    /// When the value last changed.
    pub last_changed: Instant,
    /// When the state object was last written, changed or not.
    pub last_updated: Instant,
    /// When the sensor last reported, if the host tracks it.
    pub last_reported: Option<Instant>,
}

impl SignalState {
    /// A state created just now with the given value.
    pub fn new(value: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            value: value.into(),
            last_changed: now,
            last_updated: now,
            last_reported: Some(now),
        }
    }
}

/// A state-change notification for one entity.
///
/// Either side may be absent: `old == None` when the entity appeared,
/// `new == None` when it was removed from the store.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub entity_id: String,
    pub old: Option<SignalState>,
    pub new: Option<SignalState>,
}

/// Read access plus change subscription for watched entities.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Current raw state, or `None` when the entity is unknown to the host.
    fn get(&self, entity_id: &str) -> Option<SignalState>;

    /// Subscribe to state-change notifications.
    ///
    /// Implementations may deliver changes for other entities on the same
    /// channel; subscribers filter by [`StateChange::entity_id`].
    fn subscribe(&self, entity_id: &str) -> broadcast::Receiver<StateChange>;

    /// Ask the host to re-read the entity from its source. Best effort;
    /// a failure here must never be treated as fatal by callers.
    async fn request_refresh(&self, entity_id: &str) -> anyhow::Result<()>;
}

/// In-memory [`StateStore`] backed by a map and a broadcast channel.
#[derive(Debug)]
pub struct MemoryStateStore {
    entities: RwLock<HashMap<String, SignalState>>,
    tx: broadcast::Sender<StateChange>,
    refresh_requests: RwLock<Vec<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            entities: RwLock::new(HashMap::new()),
            tx,
            refresh_requests: RwLock::new(Vec::new()),
        }
    }

    /// Set an entity's raw value and broadcast the change.
    ///
    /// `last_changed` is only advanced when the value actually differs;
    /// `last_updated` and `last_reported` advance on every call.
    pub fn set(&self, entity_id: &str, value: impl Into<String>) {
        let (old, new) = self.write_state(entity_id, value.into());
        let _ = self.tx.send(StateChange {
            entity_id: entity_id.to_string(),
            old,
            new: Some(new),
        });
    }

    /// Update the stored value without broadcasting a change.
    ///
    /// Models a poll-only entity that the host re-reads on demand but
    /// that never pushes events of its own.
    pub fn set_silent(&self, entity_id: &str, value: impl Into<String>) {
        let _ = self.write_state(entity_id, value.into());
    }

    /// Remove an entity, broadcasting a change with no new state.
    pub fn remove(&self, entity_id: &str) {
        let old = self.entities.write().remove(entity_id);
        if old.is_some() {
            let _ = self.tx.send(StateChange {
                entity_id: entity_id.to_string(),
                old,
                new: None,
            });
        }
    }

    /// Entities for which a forced refresh was requested, in order.
    pub fn refresh_requests(&self) -> Vec<String> {
        self.refresh_requests.read().clone()
    }

    /// Number of forced refreshes requested so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_requests.read().len()
    }

    fn write_state(&self, entity_id: &str, value: String) -> (Option<SignalState>, SignalState) {
        let now = Instant::now();
        let mut entities = self.entities.write();
        let old = entities.get(entity_id).cloned();
        let last_changed = match &old {
            Some(o) if o.value == value => o.last_changed,
            _ => now,
        };
        let new = SignalState {
            value,
            last_changed,
            last_updated: now,
            last_reported: Some(now),
        };
        entities.insert(entity_id.to_string(), new.clone());
        (old, new)
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    fn get(&self, entity_id: &str) -> Option<SignalState> {
        self.entities.read().get(entity_id).cloned()
    }

    fn subscribe(&self, _entity_id: &str) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    async fn request_refresh(&self, entity_id: &str) -> anyhow::Result<()> {
        self.refresh_requests.write().push(entity_id.to_string());
        Ok(())
    }
}
