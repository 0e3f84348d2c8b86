//! Shared handler state and its construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use assent_approval::{ApprovalBroker, ApprovalError, Notifier, TimeoutPolicy};
use assent_config::Config;
use assent_slack::{SlackClient, SlackClientConfig, SlackError};

/// Errors that prevent the daemon from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The Slack client could not be built.
    #[error("slack client: {0}")]
    Slack(#[from] SlackError),

    /// The timeout bounds are inconsistent.
    #[error("approval policy: {0}")]
    Policy(#[from] ApprovalError),
}

/// State shared by every request handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The approval engine.
    pub broker: ApprovalBroker,
}

impl AppState {
    /// Wrap an existing broker.
    #[must_use]
    pub fn new(broker: ApprovalBroker) -> Self {
        Self { broker }
    }

    /// Build a broker backed by the Slack Web API.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if the Slack client or timeout policy cannot
    /// be built from `config`.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let slack = SlackClient::new(SlackClientConfig {
            api_token: config.slack.api_token.clone(),
            api_url: config.slack.api_url.clone(),
            username: config.slack.username.clone(),
            icon_emoji: config.slack.icon_emoji.clone(),
            request_timeout: Duration::from_secs(config.slack.request_timeout_secs),
        })?;
        Self::with_notifier(config, Arc::new(slack))
    }

    /// Build a broker around any notifier, using `config` for the token and
    /// timeout policy.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Policy`] if the timeout bounds are inconsistent.
    pub fn with_notifier(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, StartupError> {
        let approval = &config.approval;
        let policy = TimeoutPolicy::new(
            approval.default_timeout_secs,
            approval.min_timeout_secs,
            approval.max_timeout_secs,
        )?;
        Ok(Self::new(ApprovalBroker::new(
            notifier,
            config.slack.verification_token.clone(),
            policy,
        )))
    }
}
