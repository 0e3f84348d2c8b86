//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use tracing::debug;
use url::Url;

use assent_approval::{MessageHandle, NotificationRequest, Notifier, NotifierError, Outcome};

use crate::error::{SlackError, SlackResult};
use crate::format;
use crate::types::{ApiResponse, PostMessageRequest, UpdateMessageRequest};

/// Base URL of the public Slack Web API.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Settings for [`SlackClient`].
#[derive(Clone)]
pub struct SlackClientConfig {
    /// Bot or user OAuth token.
    pub api_token: String,
    /// Web API base URL, without a trailing method name.
    pub api_url: String,
    /// Display name override for posted messages.
    pub username: Option<String>,
    /// Emoji avatar override for posted messages.
    pub icon_emoji: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl SlackClientConfig {
    /// Config for the public API with the given token.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            username: None,
            icon_emoji: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for SlackClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClientConfig")
            .field("api_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("icon_emoji", &self.icon_emoji)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Posts and updates approval messages through the Slack Web API.
pub struct SlackClient {
    http: Client,
    base_url: Url,
    auth: HeaderValue,
    username: Option<String>,
    icon_emoji: Option<String>,
}

impl SlackClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse, the token contains
    /// characters not allowed in a header, or the HTTP client cannot be built.
    pub fn new(config: SlackClientConfig) -> SlackResult<Self> {
        let mut raw = config.api_url.trim_end_matches('/').to_string();
        raw.push('/');
        let base_url = Url::parse(&raw).map_err(|e| SlackError::InvalidUrl(format!("{raw}: {e}")))?;

        let mut auth = HeaderValue::try_from(format!("Bearer {}", config.api_token))
            .map_err(|e| SlackError::Api(format!("invalid API token characters: {e}")))?;
        auth.set_sensitive(true);

        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            base_url,
            auth,
            username: config.username.filter(|s| !s.is_empty()),
            icon_emoji: config.icon_emoji.filter(|s| !s.is_empty()),
        })
    }

    /// Post a new approval request. Returns the resolved channel id and `ts`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ok: false` response.
    pub async fn post_request(&self, request: &NotificationRequest) -> SlackResult<MessageHandle> {
        let body = PostMessageRequest {
            channel: &request.channel,
            username: self.username.as_deref(),
            icon_emoji: self.icon_emoji.as_deref(),
            attachments: vec![format::pending_attachment(request)],
        };
        let response = self.call("chat.postMessage", &body).await?;

        let channel = response.channel.unwrap_or_else(|| request.channel.clone());
        let ts = response
            .ts
            .ok_or_else(|| SlackError::Api("chat.postMessage response missing ts".to_string()))?;
        Ok(MessageHandle::new(channel, ts))
    }

    /// Rewrite a posted request to show `outcome`, removing its buttons.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ok: false` response.
    pub async fn update_request(
        &self,
        handle: &MessageHandle,
        request: &NotificationRequest,
        outcome: &Outcome,
    ) -> SlackResult<()> {
        let body = UpdateMessageRequest {
            channel: &handle.channel,
            ts: &handle.id,
            attachments: vec![format::outcome_attachment(request, outcome)],
        };
        self.call("chat.update", &body).await?;
        Ok(())
    }

    async fn call<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> SlackResult<ApiResponse> {
        let url = self
            .base_url
            .join(method)
            .map_err(|e| SlackError::InvalidUrl(e.to_string()))?;
        debug!(method, "calling Slack Web API");

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth.clone())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("HTTP {status}: {text}")));
        }

        let parsed: ApiResponse = response.json().await?;
        if !parsed.ok {
            return Err(SlackError::Api(
                parsed.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(parsed)
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for SlackClient {
    async fn send(&self, request: &NotificationRequest) -> Result<MessageHandle, NotifierError> {
        Ok(self.post_request(request).await?)
    }

    async fn update(
        &self,
        handle: &MessageHandle,
        request: &NotificationRequest,
        outcome: &Outcome,
    ) -> Result<(), NotifierError> {
        Ok(self.update_request(handle, request, outcome).await?)
    }
}
