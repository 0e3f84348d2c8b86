//! Top-level façade wiring the registry, notifier and resolver together.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ApprovalResult, ResolveError};
use crate::notifier::Notifier;
use crate::registry::PendingRegistry;
use crate::resolver::{DecisionResolver, Resolution, Submission};
use crate::session::{ApprovalSession, SessionReport};
use crate::timeout::TimeoutPolicy;

/// Shared broker state. Cheap to clone.
#[derive(Clone)]
pub struct ApprovalBroker {
    registry: Arc<PendingRegistry>,
    notifier: Arc<dyn Notifier>,
    resolver: Arc<DecisionResolver>,
    policy: TimeoutPolicy,
}

impl ApprovalBroker {
    /// Create a broker with an empty registry.
    #[must_use]
    pub fn new(
        notifier: Arc<dyn Notifier>,
        verification_token: impl Into<String>,
        policy: TimeoutPolicy,
    ) -> Self {
        let registry = Arc::new(PendingRegistry::new());
        let resolver = Arc::new(DecisionResolver::new(
            Arc::clone(&registry),
            verification_token,
        ));
        Self {
            registry,
            notifier,
            resolver,
            policy,
        }
    }

    /// Start an approval and wait for its outcome.
    ///
    /// The raw timeout is validated first; an invalid value returns before
    /// anything is registered or sent.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::InvalidTimeout`](crate::ApprovalError::InvalidTimeout)
    ///   for a malformed or out-of-range timeout
    /// - [`ApprovalError::Notifier`](crate::ApprovalError::Notifier) if the
    ///   request could not be posted
    pub async fn start_approval(
        &self,
        channel: &str,
        message: &str,
        timeout: Option<&str>,
    ) -> ApprovalResult<SessionReport> {
        let timeout = self.policy.parse(timeout)?;
        let session = ApprovalSession::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.notifier),
            channel,
            message,
            timeout,
        );
        debug!(correlation_id = %session.correlation_id(), "starting approval session");
        session.run().await
    }

    /// Route an inbound decision. See [`DecisionResolver::submit`].
    ///
    /// # Errors
    ///
    /// Propagates [`ResolveError`] from the resolver.
    pub fn submit(&self, submission: Submission) -> Result<Resolution, ResolveError> {
        self.resolver.submit(submission)
    }

    /// Number of sessions currently waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// The timeout policy in force.
    #[must_use]
    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<PendingRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for ApprovalBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalBroker")
            .field("pending", &self.registry.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
