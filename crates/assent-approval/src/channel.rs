//! Single-use decision channel and the decision-versus-deadline race.
//!
//! A channel carries at most one [`Decision`] from a resolver to the waiting
//! session. Once the session stops listening (decision consumed, deadline
//! elapsed, or the session is dropped) every further delivery attempt fails
//! immediately instead of blocking the resolver.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;

use crate::decision::Decision;

/// Create a connected sender/receiver pair.
#[must_use]
pub fn decision_channel() -> (DecisionSender, DecisionReceiver) {
    let (tx, rx) = oneshot::channel();
    (DecisionSender { tx }, DecisionReceiver { rx })
}

/// Write half of a decision channel, held by the registry.
#[derive(Debug)]
pub struct DecisionSender {
    tx: oneshot::Sender<Decision>,
}

impl DecisionSender {
    /// Deliver a decision to the waiting session.
    ///
    /// Consumes the sender, so a channel can be written at most once.
    ///
    /// # Errors
    ///
    /// Returns the decision back if the session is no longer listening.
    pub fn deliver(self, decision: Decision) -> Result<(), Decision> {
        self.tx.send(decision)
    }

    /// Whether the session has stopped listening.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read half of a decision channel, owned by the session.
#[derive(Debug)]
pub struct DecisionReceiver {
    rx: oneshot::Receiver<Decision>,
}

impl DecisionReceiver {
    /// Wait for a decision, giving up once `timeout` has elapsed from now.
    pub async fn wait(self, timeout: Duration) -> Option<Decision> {
        self.wait_until(deadline_after(timeout)).await
    }

    /// Wait for a decision, giving up at `deadline`.
    ///
    /// Returns `Some` if a decision won the race and `None` if the deadline
    /// did. When the deadline fires the channel is closed and drained once:
    /// a decision accepted by the channel before the close still wins, and
    /// any delivery after it fails on the sender side. A sender reporting
    /// success therefore always means the session saw the decision.
    pub async fn wait_until(mut self, deadline: Instant) -> Option<Decision> {
        let deadline = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline);

        tokio::select! {
            biased;
            received = &mut self.rx => {
                if let Ok(decision) = received {
                    return Some(decision);
                }
                // Sender dropped undelivered. Nothing can arrive any more, but
                // the outcome is still fixed by the deadline.
                warn!("decision channel closed without a decision, waiting out the deadline");
                deadline.await;
                return None;
            },
            () = &mut deadline => {},
        }

        self.rx.close();
        self.rx.try_recv().ok()
    }
}

/// The instant `timeout` from now.
///
/// Durations too large to represent saturate the way `tokio::time::sleep`
/// does.
#[must_use]
pub fn deadline_after(timeout: Duration) -> Instant {
    Instant::now()
        .checked_add(timeout)
        .unwrap_or_else(|| tokio::time::sleep(timeout).deadline())
}
