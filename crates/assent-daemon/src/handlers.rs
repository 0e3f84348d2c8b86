//! Route handlers.

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use assent_approval::{Outcome, Resolution};
use assent_slack::{ActionCallback, Message, format};

use crate::error::{ApiError, result_response};
use crate::state::AppState;

/// Form accepted by the request endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AskForm {
    /// Destination channel.
    #[serde(default)]
    pub ch: Option<String>,
    /// Message shown to approvers.
    #[serde(default)]
    pub msg: Option<String>,
    /// Deadline in seconds. Empty or absent selects the default.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Form Slack posts to the callback endpoint.
#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    /// Interactive message JSON.
    pub payload: String,
}

/// Body of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `ok`.
    pub status: &'static str,
    /// Approvals currently waiting.
    pub pending: usize,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

/// Start an approval and hold the request open until it resolves.
pub async fn ask(
    State(state): State<AppState>,
    form: Result<Form<AskForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let (Some(channel), Some(message)) = (non_empty(form.ch), non_empty(form.msg)) else {
        return Err(ApiError::InvalidRequest("ch and msg are required".to_owned()));
    };

    let report = state
        .broker
        .start_approval(&channel, &message, form.timeout.as_deref())
        .await?;

    let status = match report.outcome {
        Outcome::Approved { .. } => StatusCode::OK,
        Outcome::Canceled { .. } | Outcome::Expired => StatusCode::FORBIDDEN,
    };
    Ok(result_response(status, report.outcome.label()))
}

/// Handle a button click relayed by Slack.
pub async fn interactive_callback(
    State(state): State<AppState>,
    form: Result<Form<CallbackForm>, FormRejection>,
) -> Result<Json<Message>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::MalformedCallback(e.body_text()))?;
    let callback = ActionCallback::from_payload(&form.payload)?;
    debug!(callback_id = %callback.callback_id, "received interactive callback");

    match state.broker.submit(callback.to_submission()?)? {
        Resolution::Delivered(decision) => {
            info!(
                correlation_id = %callback.callback_id,
                action = %decision.action,
                actor = %decision.actor,
                "callback resolved approval"
            );
            Ok(Json(format::decided_message(
                callback.original_message,
                &decision,
            )))
        },
        Resolution::NotFound => Err(ApiError::NotPending),
    }
}

/// Liveness probe.
pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        pending: state.broker.pending_count(),
    })
}
