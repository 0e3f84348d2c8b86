//! Callback-side entry point.
//!
//! The resolver authenticates an inbound decision, parses its action and
//! hands it to the registry. It never blocks on the waiting session.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::correlation::CorrelationId;
use crate::decision::{Decision, DecisionAction};
use crate::error::ResolveError;
use crate::registry::{Delivery, PendingRegistry};

/// A decision as received from the messaging surface, not yet trusted.
#[derive(Clone, PartialEq, Eq)]
pub struct Submission {
    /// Id echoed back by the platform.
    pub correlation_id: CorrelationId,
    /// Raw action name (`approve` or `cancel`).
    pub action: String,
    /// Who clicked.
    pub actor: String,
    /// Shared verification token carried by the callback.
    pub token: String,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("correlation_id", &self.correlation_id)
            .field("action", &self.action)
            .field("actor", &self.actor)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Result of an authenticated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The waiting session received this decision.
    Delivered(Decision),
    /// No session is waiting on the id: unknown, already decided, or expired.
    NotFound,
}

impl Resolution {
    /// Whether the decision reached a session.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Authenticates and routes decisions into the pending registry.
pub struct DecisionResolver {
    registry: Arc<PendingRegistry>,
    verification_token: String,
}

impl DecisionResolver {
    /// Create a resolver bound to a registry and verification token.
    #[must_use]
    pub fn new(registry: Arc<PendingRegistry>, verification_token: impl Into<String>) -> Self {
        Self {
            registry,
            verification_token: verification_token.into(),
        }
    }

    /// Authenticate, parse and deliver a submission.
    ///
    /// Token and action are checked before the registry is touched, so a
    /// rejected submission never consumes a pending entry.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Unauthorized`] if the token does not match
    /// - [`ResolveError::UnsupportedAction`] if the action is unknown
    pub fn submit(&self, submission: Submission) -> Result<Resolution, ResolveError> {
        if !self.token_matches(&submission.token) {
            warn!(correlation_id = %submission.correlation_id, "rejected callback with invalid token");
            return Err(ResolveError::Unauthorized);
        }

        let action: DecisionAction = submission.action.parse()?;
        let decision = Decision::new(action, submission.actor);

        match self.registry.resolve(&submission.correlation_id, decision.clone()) {
            Delivery::Delivered => {
                info!(
                    correlation_id = %submission.correlation_id,
                    action = %decision.action,
                    actor = %decision.actor,
                    "decision delivered"
                );
                Ok(Resolution::Delivered(decision))
            },
            Delivery::NotFound => {
                debug!(correlation_id = %submission.correlation_id, "no pending approval for decision");
                Ok(Resolution::NotFound)
            },
        }
    }

    fn token_matches(&self, token: &str) -> bool {
        token
            .as_bytes()
            .ct_eq(self.verification_token.as_bytes())
            .into()
    }
}

impl std::fmt::Debug for DecisionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionResolver")
            .field("registry", &self.registry)
            .field("verification_token", &"[REDACTED]")
            .finish()
    }
}
