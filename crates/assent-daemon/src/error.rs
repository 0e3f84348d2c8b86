//! HTTP error mapping.
//!
//! Every failure the handlers can produce is an [`ApiError`]; this is the
//! only place status codes for failures are chosen.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONNECTION;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use assent_approval::{ApprovalError, NotifierError, ResolveError};
use assent_slack::{SlackError, format};

/// JSON body returned by the request endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultBody {
    /// `approved`, `canceled`, `expired`, `invalid request` or `notifier error`.
    pub result: &'static str,
}

/// Response for the request endpoint: status, `Connection: close`, JSON body.
pub(crate) fn result_response(status: StatusCode, result: &'static str) -> Response {
    (status, [(CONNECTION, "close")], Json(ResultBody { result })).into_response()
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing channel or message, or an unusable timeout.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The approval message could not be posted.
    #[error("notifier error: {0}")]
    Notifier(#[from] NotifierError),

    /// The callback body or its payload JSON was malformed.
    #[error("malformed callback: {0}")]
    MalformedCallback(String),

    /// The callback token did not match.
    #[error("callback token mismatch")]
    Unauthorized,

    /// The callback carried an action other than approve or cancel.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// The callback names a request that is no longer waiting.
    #[error("approval request is no longer pending")]
    NotPending,
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::InvalidTimeout { .. } => Self::InvalidRequest(err.to_string()),
            ApprovalError::Notifier(e) => Self::Notifier(e),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unauthorized => Self::Unauthorized,
            ResolveError::UnsupportedAction(action) => Self::UnsupportedAction(action),
        }
    }
}

impl From<SlackError> for ApiError {
    fn from(err: SlackError) -> Self {
        Self::MalformedCallback(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidRequest(reason) => {
                warn!(reason = %reason, "rejected approval request");
                result_response(StatusCode::FORBIDDEN, "invalid request")
            },
            Self::Notifier(e) => {
                error!(error = %e, "failed to post approval request");
                result_response(StatusCode::INTERNAL_SERVER_ERROR, "notifier error")
            },
            Self::MalformedCallback(reason) => {
                warn!(reason = %reason, "malformed interactive callback");
                StatusCode::BAD_REQUEST.into_response()
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::UnsupportedAction(action) => {
                warn!(action = %action, "unsupported callback action");
                StatusCode::BAD_REQUEST.into_response()
            },
            Self::NotPending => {
                (StatusCode::NOT_FOUND, Json(format::not_pending_reply())).into_response()
            },
        }
    }
}
