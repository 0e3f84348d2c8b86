//! Error types for the Slack integration.

use assent_approval::NotifierError;
use thiserror::Error;

/// Errors that can occur when talking to Slack.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The HTTP request failed or the response body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),

    /// The configured API base URL is unusable.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// An interactive callback payload could not be decoded.
    #[error("invalid callback payload: {0}")]
    InvalidPayload(String),

    /// The callback carried no action.
    #[error("callback contains no action")]
    MissingAction,
}

/// Convenience result alias for Slack operations.
pub type SlackResult<T> = Result<T, SlackError>;

impl From<SlackError> for NotifierError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Api(code) => Self::Api(code),
            other => Self::Transport(other.to_string()),
        }
    }
}
