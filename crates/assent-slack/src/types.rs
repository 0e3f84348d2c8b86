//! Slack wire types for legacy message attachments and interactive callbacks.
//!
//! Only the fields the broker reads or writes are modelled. Anything else
//! Slack sends on a message or attachment is kept in `extra` so an echoed
//! `original_message` survives a round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use assent_approval::{CorrelationId, Submission};

use crate::error::{SlackError, SlackResult};

/// An interactive button on a legacy attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentAction {
    /// Action name echoed back in callbacks.
    pub name: String,
    /// Button label.
    pub text: String,
    /// Element type, always `button` here.
    #[serde(rename = "type")]
    pub kind: String,
    /// `primary` or `danger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Optional value echoed back in callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A legacy message attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Line shown above the attachment body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    /// Attachment body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Side bar color (`good`, `warning`, `danger` or a hex code).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Identifier echoed back in interactive callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    /// Buttons. An empty list removes them.
    #[serde(default)]
    pub actions: Vec<AttachmentAction>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chat message as echoed back in `original_message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Top level text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Attachments, in display order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The clicked action in an interactive callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAction {
    /// Name of the clicked button.
    pub name: String,
    /// Optional value of the clicked button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The user who clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackUser {
    /// Slack user id.
    #[serde(default)]
    pub id: String,
    /// Slack user name.
    #[serde(default)]
    pub name: String,
}

/// Payload Slack posts to the interactive action endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCallback {
    /// Legacy verification token.
    #[serde(default)]
    pub token: String,
    /// The `callback_id` of the clicked attachment.
    #[serde(default)]
    pub callback_id: String,
    /// Clicked actions. Slack sends exactly one for buttons.
    #[serde(default)]
    pub actions: Vec<CallbackAction>,
    /// Who clicked.
    pub user: CallbackUser,
    /// The message the buttons were attached to.
    #[serde(default)]
    pub original_message: Message,
}

impl ActionCallback {
    /// Decode the JSON carried in the `payload` form field.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidPayload`] if the JSON is malformed.
    pub fn from_payload(payload: &str) -> SlackResult<Self> {
        serde_json::from_str(payload).map_err(|e| SlackError::InvalidPayload(e.to_string()))
    }

    /// Name of the first clicked action.
    #[must_use]
    pub fn action_name(&self) -> Option<&str> {
        self.actions.first().map(|a| a.name.as_str())
    }

    /// Convert into an unauthenticated engine submission.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::MissingAction`] if no action was clicked.
    pub fn to_submission(&self) -> SlackResult<Submission> {
        let action = self.action_name().ok_or(SlackError::MissingAction)?;
        Ok(Submission {
            correlation_id: CorrelationId::from(self.callback_id.as_str()),
            action: action.to_owned(),
            actor: self.user.name.clone(),
            token: self.token.clone(),
        })
    }
}

impl std::fmt::Debug for ActionCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCallback")
            .field("token", &"[REDACTED]")
            .field("callback_id", &self.callback_id)
            .field("actions", &self.actions)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Body of an ephemeral reply to an interactive callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralReply {
    /// `ephemeral`: only the clicking user sees the reply.
    pub response_type: String,
    /// Reply text.
    pub text: String,
    /// Whether the reply replaces the original message.
    pub replace_original: bool,
}

impl EphemeralReply {
    /// An ephemeral reply that leaves the original message alone.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            response_type: "ephemeral".to_string(),
            text: text.into(),
            replace_original: false,
        }
    }
}

/// `chat.postMessage` request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PostMessageRequest<'a> {
    pub(crate) channel: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) icon_emoji: Option<&'a str>,
    pub(crate) attachments: Vec<Attachment>,
}

/// `chat.update` request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateMessageRequest<'a> {
    pub(crate) channel: &'a str,
    pub(crate) ts: &'a str,
    pub(crate) attachments: Vec<Attachment>,
}

/// Common envelope of Web API responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiResponse {
    pub(crate) ok: bool,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) channel: Option<String>,
    #[serde(default)]
    pub(crate) ts: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r##"{
        "type": "interactive_message",
        "token": "verif",
        "callback_id": "3f2b",
        "actions": [{"name": "approve", "type": "button", "value": ""}],
        "user": {"id": "U1", "name": "alice"},
        "original_message": {
            "text": "",
            "ts": "1700000000.000100",
            "attachments": [{
                "id": 1,
                "pretext": "deploy?",
                "text": "Waiting for someone's approval...",
                "color": "warning",
                "callback_id": "3f2b",
                "actions": [{"id": "1", "name": "approve", "text": "Approve", "type": "button", "style": "primary"}]
            }]
        }
    }"##;

    #[test]
    fn decodes_interactive_payload() {
        let callback = ActionCallback::from_payload(PAYLOAD).unwrap();
        assert_eq!(callback.token, "verif");
        assert_eq!(callback.action_name(), Some("approve"));
        assert_eq!(callback.user.name, "alice");
        assert_eq!(callback.original_message.attachments.len(), 1);
        assert_eq!(
            callback.original_message.extra.get("ts"),
            Some(&Value::String("1700000000.000100".to_string()))
        );
    }

    #[test]
    fn converts_to_submission() {
        let submission = ActionCallback::from_payload(PAYLOAD)
            .unwrap()
            .to_submission()
            .unwrap();
        assert_eq!(submission.correlation_id.as_str(), "3f2b");
        assert_eq!(submission.action, "approve");
        assert_eq!(submission.actor, "alice");
        assert_eq!(submission.token, "verif");
    }

    #[test]
    fn missing_action_is_an_error() {
        let callback =
            ActionCallback::from_payload(r#"{"token":"t","callback_id":"x","actions":[],"user":{"name":"a"}}"#)
                .unwrap();
        assert!(matches!(callback.to_submission(), Err(SlackError::MissingAction)));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(matches!(
            ActionCallback::from_payload("{not json"),
            Err(SlackError::InvalidPayload(_))
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let callback = ActionCallback::from_payload(PAYLOAD).unwrap();
        assert!(!format!("{callback:?}").contains("verif"));
    }

    #[test]
    fn ephemeral_reply_shape() {
        let json = serde_json::to_value(EphemeralReply::new("gone")).unwrap();
        assert_eq!(json["response_type"], "ephemeral");
        assert_eq!(json["replace_original"], false);
    }
}
