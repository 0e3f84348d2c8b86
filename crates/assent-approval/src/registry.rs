//! Pending-approval registry.

use dashmap::DashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::channel::DecisionSender;
use crate::correlation::CorrelationId;
use crate::decision::Decision;

/// Result of a delivery attempt through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The decision reached the waiting session.
    Delivered,
    /// No session is listening for this id (resolved, expired, or unknown).
    NotFound,
}

/// Concurrent map from correlation id to the sender of its decision channel.
///
/// Shared between every in-flight session and the callback path through an
/// `Arc`. Sharded via [`DashMap`], so operations on different ids do not
/// contend; operations on the same id are linearized by its shard lock.
///
/// # Example
///
/// ```
/// use assent_approval::{CorrelationId, PendingRegistry, decision_channel};
///
/// let registry = PendingRegistry::new();
/// let id = CorrelationId::new();
/// let (tx, _rx) = decision_channel();
///
/// registry.register(id.clone(), tx);
/// assert!(registry.contains(&id));
///
/// registry.deregister(&id);
/// registry.deregister(&id); // no-op
/// assert!(registry.is_empty());
/// ```
#[derive(Default)]
pub struct PendingRegistry {
    entries: DashMap<CorrelationId, DecisionSender>,
}

impl PendingRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert a channel for `id`, visible to concurrent lookups immediately.
    ///
    /// Callers mint fresh ids, so `id` is expected to be absent. Should it be
    /// present anyway, the previous sender is dropped, which makes its
    /// session fall through to its deadline rather than receive a decision
    /// meant for someone else.
    pub fn register(&self, id: CorrelationId, sender: DecisionSender) {
        if self.entries.insert(id.clone(), sender).is_some() {
            warn!(correlation_id = %id, "correlation id was already registered, replaced");
        } else {
            debug!(correlation_id = %id, "registered pending approval");
        }
    }

    /// Deliver `decision` to the session registered under `id`.
    ///
    /// The entry is removed before delivery, so among concurrent callers for
    /// the same id at most one ever holds the sender. Delivery itself never
    /// blocks: a session that already stopped listening makes it fail and the
    /// caller observes [`Delivery::NotFound`].
    pub fn resolve(&self, id: &CorrelationId, decision: Decision) -> Delivery {
        let Some((_, sender)) = self.entries.remove(id) else {
            debug!(correlation_id = %id, "no pending approval for id");
            return Delivery::NotFound;
        };

        match sender.deliver(decision) {
            Ok(()) => Delivery::Delivered,
            Err(_) => {
                debug!(correlation_id = %id, "session stopped listening before delivery");
                Delivery::NotFound
            },
        }
    }

    /// Remove the entry for `id`. Removing an absent id is a no-op.
    pub fn deregister(&self, id: &CorrelationId) {
        if self.entries.remove(id).is_some() {
            debug!(correlation_id = %id, "deregistered pending approval");
        }
    }

    /// Check whether `id` is currently pending.
    #[must_use]
    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of pending approvals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no approvals are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the pending ids, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<CorrelationId> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl fmt::Debug for PendingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRegistry")
            .field("pending", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
