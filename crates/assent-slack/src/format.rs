//! Message rendering for each stage of an approval.

use assent_approval::{ActionStyle, Decision, DecisionAction, NotificationRequest, OfferedAction, Outcome};

use crate::types::{Attachment, AttachmentAction, EphemeralReply, Message};

/// Attachment body while the request is waiting.
pub const PENDING_TEXT: &str = "Waiting for someone's approval...";

/// Attachment body once the deadline has passed.
pub const EXPIRED_TEXT: &str = "This approval request was expired.";

/// Ephemeral reply for clicks on a request that is no longer waiting.
pub const NOT_PENDING_TEXT: &str = "This approval request is no longer pending.";

const COLOR_WARNING: &str = "warning";
const COLOR_GOOD: &str = "good";
const COLOR_DANGER: &str = "danger";

fn button(offered: &OfferedAction) -> AttachmentAction {
    let style = match offered.style {
        ActionStyle::Primary => "primary",
        ActionStyle::Danger => "danger",
    };
    AttachmentAction {
        name: offered.action.as_str().to_string(),
        text: offered.label.clone(),
        kind: "button".to_string(),
        style: Some(style.to_string()),
        value: None,
    }
}

/// The attachment posted when an approval starts.
#[must_use]
pub fn pending_attachment(request: &NotificationRequest) -> Attachment {
    Attachment {
        pretext: Some(request.text.clone()),
        text: Some(PENDING_TEXT.to_string()),
        color: Some(COLOR_WARNING.to_string()),
        callback_id: Some(request.correlation_id.to_string()),
        actions: request.actions.iter().map(button).collect(),
        ..Attachment::default()
    }
}

/// The attachment a posted request is rewritten to once it reaches `outcome`.
///
/// Buttons are always removed.
#[must_use]
pub fn outcome_attachment(request: &NotificationRequest, outcome: &Outcome) -> Attachment {
    let mut attachment = pending_attachment(request);
    let (text, color) = outcome_text(outcome);
    attachment.text = Some(text);
    attachment.color = Some(color.to_string());
    attachment.actions.clear();
    attachment
}

/// Rewrite the message echoed in a callback to show who decided.
///
/// The first attachment gets the attribution and loses its buttons; every
/// other field of the echoed message is preserved.
#[must_use]
pub fn decided_message(mut original: Message, decision: &Decision) -> Message {
    let (text, color) = outcome_text(&Outcome::from(decision.clone()));
    if original.attachments.is_empty() {
        original.attachments.push(Attachment::default());
    }
    if let Some(first) = original.attachments.first_mut() {
        first.text = Some(text);
        first.color = Some(color.to_string());
        first.actions.clear();
    }
    original
}

/// Reply for a click on a request that has already finished.
#[must_use]
pub fn not_pending_reply() -> EphemeralReply {
    EphemeralReply::new(NOT_PENDING_TEXT)
}

fn outcome_text(outcome: &Outcome) -> (String, &'static str) {
    match outcome {
        Outcome::Approved { actor } => (
            format!("{} by @{actor}", verb(DecisionAction::Approve)),
            COLOR_GOOD,
        ),
        Outcome::Canceled { actor } => (
            format!("{} by @{actor}", verb(DecisionAction::Cancel)),
            COLOR_DANGER,
        ),
        Outcome::Expired => (EXPIRED_TEXT.to_string(), COLOR_DANGER),
    }
}

fn verb(action: DecisionAction) -> &'static str {
    match action {
        DecisionAction::Approve => "Approved",
        DecisionAction::Cancel => "Canceled",
    }
}
