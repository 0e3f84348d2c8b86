//! Mock implementations for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use assent_approval::{
    CorrelationId, MessageHandle, NotificationRequest, Notifier, NotifierError, Outcome,
};

/// A call observed by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    /// An initial post.
    Send(NotificationRequest),
    /// A rewrite of an earlier post.
    Update {
        /// Which message was rewritten.
        handle: MessageHandle,
        /// The outcome it was rewritten to.
        outcome: Outcome,
    },
}

/// Recording implementation of the `Notifier` trait.
///
/// Uses `std::sync::Mutex` internally so builder methods work without a
/// tokio runtime. Waiters can block on [`MockNotifier::next_send`] to learn
/// the correlation id of a session that is about to wait.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    calls: Arc<Mutex<Vec<NotifierCall>>>,
    send_error: Arc<Mutex<Option<NotifierError>>>,
    update_error: Arc<Mutex<Option<NotifierError>>>,
    send_delay: Arc<Mutex<Duration>>,
    sent_signal: Arc<Notify>,
    next_ts: Arc<AtomicU64>,
}

impl MockNotifier {
    /// Create a notifier that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail with `error`.
    #[must_use]
    pub fn with_send_error(self, error: NotifierError) -> Self {
        if let Ok(mut guard) = self.send_error.lock() {
            *guard = Some(error);
        }
        self
    }

    /// Hold every send for `delay` before answering, like a slow API.
    #[must_use]
    pub fn with_send_delay(self, delay: Duration) -> Self {
        if let Ok(mut guard) = self.send_delay.lock() {
            *guard = delay;
        }
        self
    }

    /// Make every update fail with `error`.
    #[must_use]
    pub fn with_update_error(self, error: NotifierError) -> Self {
        if let Ok(mut guard) = self.update_error.lock() {
            *guard = Some(error);
        }
        self
    }

    /// All calls seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Requests passed to successful sends.
    #[must_use]
    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Send(request) => Some(request),
                NotifierCall::Update { .. } => None,
            })
            .collect()
    }

    /// Outcomes passed to updates.
    #[must_use]
    pub fn updates(&self) -> Vec<Outcome> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Update { outcome, .. } => Some(outcome),
                NotifierCall::Send(_) => None,
            })
            .collect()
    }

    /// Wait until at least `count` sends have succeeded and return the
    /// correlation id of the `count`-th one.
    pub async fn next_send(&self, count: usize) -> CorrelationId {
        loop {
            let notified = self.sent_signal.notified();
            if let Some(request) = self.sent().get(count.saturating_sub(1)) {
                return request.correlation_id.clone();
            }
            notified.await;
        }
    }

    fn record(&self, call: NotifierCall) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(call);
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, request: &NotificationRequest) -> Result<MessageHandle, NotifierError> {
        let delay = self.send_delay.lock().map(|g| *g).unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.send_error.lock().ok().and_then(|g| g.clone()) {
            return Err(error);
        }
        let seq = self.next_ts.fetch_add(1, Ordering::SeqCst);
        self.record(NotifierCall::Send(request.clone()));
        self.sent_signal.notify_waiters();
        Ok(MessageHandle::new(
            request.channel.clone(),
            format!("1700000000.{seq:06}"),
        ))
    }

    async fn update(
        &self,
        handle: &MessageHandle,
        _request: &NotificationRequest,
        outcome: &Outcome,
    ) -> Result<(), NotifierError> {
        self.record(NotifierCall::Update {
            handle: handle.clone(),
            outcome: outcome.clone(),
        });
        match self.update_error.lock().ok().and_then(|g| g.clone()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NotificationRequest {
        NotificationRequest::new("#ops", "deploy?", CorrelationId::from("abc"))
    }

    #[tokio::test]
    async fn test_mock_notifier_records_calls() {
        let notifier = MockNotifier::new();
        let handle = notifier.send(&request()).await.unwrap();
        notifier
            .update(&handle, &request(), &Outcome::Expired)
            .await
            .unwrap();

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.updates(), vec![Outcome::Expired]);
        assert_eq!(notifier.next_send(1).await, CorrelationId::from("abc"));
    }

    #[tokio::test]
    async fn test_mock_notifier_failures() {
        let notifier = MockNotifier::new()
            .with_send_error(NotifierError::Api("channel_not_found".to_string()))
            .with_update_error(NotifierError::Transport("reset".to_string()));

        assert!(notifier.send(&request()).await.is_err());
        assert!(notifier.sent().is_empty());

        let handle = MessageHandle::new("#ops", "1");
        assert!(
            notifier
                .update(&handle, &request(), &Outcome::Expired)
                .await
                .is_err()
        );
        assert_eq!(notifier.updates().len(), 1);
    }
}
