//! Assent Slack - Slack Web API notifier for the Assent approval broker.
//!
//! Provides:
//! - [`SlackClient`]: a [`Notifier`](assent_approval::Notifier) that posts
//!   approval requests with `chat.postMessage` and marks expired ones with
//!   `chat.update`
//! - [`ActionCallback`]: the interactive message payload Slack posts back
//!   when a button is clicked
//! - [`format`]: rendering of pending, decided and expired messages

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod error;
pub mod format;
pub mod types;

pub use client::{DEFAULT_API_URL, SlackClient, SlackClientConfig};
pub use error::{SlackError, SlackResult};
pub use types::{
    ActionCallback, Attachment, AttachmentAction, CallbackAction, CallbackUser, EphemeralReply,
    Message,
};
