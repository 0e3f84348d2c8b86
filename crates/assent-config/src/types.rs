//! Configuration types for the Assent approval broker.
//!
//! Every struct implements [`Default`] so that a bare `[section]` header in
//! TOML produces a usable section. The two Slack tokens are the exception:
//! they default to empty and validation rejects them until supplied.

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener and route paths.
    pub server: ServerSection,
    /// Slack Web API credentials and message overrides.
    pub slack: SlackSection,
    /// Deadline bounds for approval requests.
    pub approval: ApprovalSection,
    /// Logging and tracing configuration.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// ServerSection
// ---------------------------------------------------------------------------

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Path of the blocking approval endpoint.
    pub request_path: String,
    /// Path Slack posts interactive callbacks to.
    pub callback_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: 8080,
            request_path: "/ask".to_owned(),
            callback_path: "/interactive_action_callback".to_owned(),
        }
    }
}

impl ServerSection {
    /// `bind:port` suitable for a TCP listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// ---------------------------------------------------------------------------
// SlackSection
// ---------------------------------------------------------------------------

/// Slack Web API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SlackSection {
    /// OAuth token used for `chat.postMessage` and `chat.update`.
    pub api_token: String,
    /// Legacy verification token carried by interactive callbacks.
    pub verification_token: String,
    /// Display name override for posted messages.
    pub username: Option<String>,
    /// Emoji avatar override for posted messages.
    pub icon_emoji: Option<String>,
    /// Web API base URL.
    pub api_url: String,
    /// Per-request timeout for Web API calls.
    pub request_timeout_secs: u64,
}

impl Default for SlackSection {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            verification_token: String::new(),
            username: None,
            icon_emoji: None,
            api_url: "https://slack.com/api".to_owned(),
            request_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for SlackSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackSection")
            .field("has_api_token", &!self.api_token.is_empty())
            .field("has_verification_token", &!self.verification_token.is_empty())
            .field("username", &self.username)
            .field("icon_emoji", &self.icon_emoji)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Serialize for SlackSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SlackSection", 4)?;
        // Tokens are never serialized.
        state.serialize_field("username", &self.username)?;
        state.serialize_field("icon_emoji", &self.icon_emoji)?;
        state.serialize_field("api_url", &self.api_url)?;
        state.serialize_field("request_timeout_secs", &self.request_timeout_secs)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// ApprovalSection
// ---------------------------------------------------------------------------

/// Deadline bounds, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSection {
    /// Deadline used when a request omits `timeout`.
    pub default_timeout_secs: u64,
    /// Smallest accepted deadline.
    pub min_timeout_secs: u64,
    /// Largest accepted deadline.
    pub max_timeout_secs: u64,
}

impl Default for ApprovalSection {
    fn default() -> Self {
        Self {
            default_timeout_secs: 60,
            min_timeout_secs: 0,
            max_timeout_secs: 600,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["assent_slack=debug",
    /// "hyper=warn"]`).
    pub directives: Vec<String>,
    /// Write daily-rotated log files here instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: None,
        }
    }
}
