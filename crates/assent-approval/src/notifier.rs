//! Outbound messaging seam.
//!
//! The engine never talks to a chat platform directly. It asks a
//! [`Notifier`] to post the initial request and, on expiry, to rewrite that
//! message. Decided messages are rewritten by the callback response instead,
//! so the notifier only sees the expired outcome in practice.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationId;
use crate::decision::{DecisionAction, Outcome};

/// Errors reported by a [`Notifier`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifierError {
    /// The request never reached the platform, or the response was unreadable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform answered with an error.
    #[error("api error: {0}")]
    Api(String),
}

/// Visual emphasis of an offered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    /// Highlighted as the expected choice.
    Primary,
    /// Highlighted as destructive.
    Danger,
}

/// A button offered alongside the request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedAction {
    /// The decision the button delivers.
    pub action: DecisionAction,
    /// Human readable label.
    pub label: String,
    /// Visual emphasis.
    pub style: ActionStyle,
}

impl OfferedAction {
    /// The standard approve button.
    #[must_use]
    pub fn approve() -> Self {
        Self {
            action: DecisionAction::Approve,
            label: "Approve".to_string(),
            style: ActionStyle::Primary,
        }
    }

    /// The standard cancel button.
    #[must_use]
    pub fn cancel() -> Self {
        Self {
            action: DecisionAction::Cancel,
            label: "Cancel".to_string(),
            style: ActionStyle::Danger,
        }
    }
}

/// Everything a notifier needs to post an approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Destination channel.
    pub channel: String,
    /// Text shown to approvers.
    pub text: String,
    /// Tag echoed back by the platform in decision callbacks.
    pub correlation_id: CorrelationId,
    /// Buttons to render, in order.
    pub actions: Vec<OfferedAction>,
}

impl NotificationRequest {
    /// Build a request offering the standard approve and cancel buttons.
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        text: impl Into<String>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            correlation_id,
            actions: vec![OfferedAction::approve(), OfferedAction::cancel()],
        }
    }
}

/// Locator of a posted message, used to update it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    /// Channel the message lives in (as resolved by the platform).
    pub channel: String,
    /// Platform message identifier (a Slack `ts`).
    pub id: String,
}

impl MessageHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new(channel: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            id: id.into(),
        }
    }
}

/// Outbound messaging surface.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post the initial approval request.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be posted. No session waits
    /// on a request whose send failed.
    async fn send(&self, request: &NotificationRequest) -> Result<MessageHandle, NotifierError>;

    /// Rewrite a previously posted message to reflect a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the update was rejected. Callers treat updates as
    /// best-effort.
    async fn update(
        &self,
        handle: &MessageHandle,
        request: &NotificationRequest,
        outcome: &Outcome,
    ) -> Result<(), NotifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_request_offers_approve_then_cancel() {
        let request = NotificationRequest::new("#ops", "deploy?", CorrelationId::from("abc"));
        let actions: Vec<_> = request.actions.iter().map(|a| a.action).collect();
        assert_eq!(actions, vec![DecisionAction::Approve, DecisionAction::Cancel]);
        assert_eq!(request.actions[0].style, ActionStyle::Primary);
        assert_eq!(request.actions[1].style, ActionStyle::Danger);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            NotifierError::Api("not_in_channel".to_string()).to_string(),
            "api error: not_in_channel"
        );
        assert_eq!(
            NotifierError::Transport("connection refused".to_string()).to_string(),
            "transport error: connection refused"
        );
    }
}
