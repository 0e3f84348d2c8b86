//! Assent Daemon - HTTP front end for the Slack approval broker.
//!
//! Exposes three routes:
//!
//! - `POST /ask` (configurable): post an approval request to a channel and
//!   block until someone approves, cancels, or the deadline passes
//! - `POST /interactive_action_callback` (configurable): Slack button clicks
//! - `GET /healthz`: liveness and the number of waiting requests

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ResultBody};
pub use routes::{RoutePaths, router};
pub use server::serve;
pub use state::{AppState, StartupError};
