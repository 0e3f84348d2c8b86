//! One initiator call: register, notify, race, clean up.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::channel::{deadline_after, decision_channel};
use crate::correlation::CorrelationId;
use crate::decision::Outcome;
use crate::error::ApprovalResult;
use crate::notifier::{MessageHandle, NotificationRequest, Notifier, NotifierError};
use crate::registry::PendingRegistry;

/// What a finished session reports back to the initiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Id the session was registered under.
    pub correlation_id: CorrelationId,
    /// Terminal outcome.
    pub outcome: Outcome,
    /// Message posted for this session.
    pub message: MessageHandle,
    /// Set when the expiry rewrite of the message failed. The outcome is
    /// still [`Outcome::Expired`].
    pub expiry_update_error: Option<NotifierError>,
}

/// A single approval request waiting on a human.
///
/// [`run`](Self::run) resolves to exactly one [`Outcome`]. The registry entry
/// created for the session is removed on every exit path, including when the
/// future is dropped before completion.
pub struct ApprovalSession {
    registry: Arc<PendingRegistry>,
    notifier: Arc<dyn Notifier>,
    request: NotificationRequest,
    timeout: Duration,
}

impl ApprovalSession {
    /// Prepare a session with a freshly minted correlation id.
    #[must_use]
    pub fn new(
        registry: Arc<PendingRegistry>,
        notifier: Arc<dyn Notifier>,
        channel: impl Into<String>,
        text: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let request = NotificationRequest::new(channel, text, CorrelationId::new());
        Self {
            registry,
            notifier,
            request,
            timeout,
        }
    }

    /// The id this session will register under.
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.request.correlation_id
    }

    /// The deadline, measured from registration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the session to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Notifier`](crate::ApprovalError::Notifier) if
    /// the initial send fails. Expiry update failures are not errors; they
    /// are reported in [`SessionReport::expiry_update_error`].
    pub async fn run(self) -> ApprovalResult<SessionReport> {
        let span = info_span!(
            "approval_session",
            correlation_id = %self.request.correlation_id,
            channel = %self.request.channel,
        );
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> ApprovalResult<SessionReport> {
        let Self {
            registry,
            notifier,
            request,
            timeout,
        } = self;
        let id = request.correlation_id.clone();

        // Register before sending so a callback racing the send response
        // still finds the entry. The deadline runs from here, so a slow send
        // eats into it rather than extending it.
        let (tx, rx) = decision_channel();
        registry.register(id.clone(), tx);
        let deadline = deadline_after(timeout);
        let registration = Registration {
            registry: Arc::clone(&registry),
            id: id.clone(),
        };

        let message = match notifier.send(&request).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "failed to post approval request");
                return Err(e.into());
            },
        };
        info!(
            message_id = %message.id,
            timeout_secs = timeout.as_secs(),
            "approval request posted, waiting for decision"
        );

        let outcome = rx.wait_until(deadline).await.map_or(Outcome::Expired, Outcome::from);
        drop(registration);

        let expiry_update_error = if outcome == Outcome::Expired {
            match notifier.update(&message, &request, &outcome).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(error = %e, "failed to mark approval request as expired");
                    Some(e)
                },
            }
        } else {
            None
        };

        info!(outcome = outcome.label(), actor = ?outcome.actor(), "approval session finished");

        Ok(SessionReport {
            correlation_id: id,
            outcome,
            message,
            expiry_update_error,
        })
    }
}

impl std::fmt::Debug for ApprovalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalSession")
            .field("correlation_id", &self.request.correlation_id)
            .field("channel", &self.request.channel)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Removes the registry entry when the session ends, however it ends.
struct Registration {
    registry: Arc<PendingRegistry>,
    id: CorrelationId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(&self.id);
        debug!(correlation_id = %self.id, "deregistered approval session");
    }
}
