//! Assent Approval - correlation and timeout-race engine.
//!
//! This crate owns the part of the approval broker that needs careful
//! concurrency reasoning. Everything else (HTTP, Slack, configuration) lives
//! in sibling crates and talks to this one through three seams:
//!
//! - [`Notifier`]: outbound messaging surface (implemented by `assent-slack`)
//! - [`ApprovalSession`] / [`ApprovalBroker::start_approval`]: the blocking
//!   initiator call
//! - [`DecisionResolver`]: invoked once per inbound callback
//!
//! # Lifecycle
//!
//! 1. A session mints a [`CorrelationId`] and registers a fresh decision
//!    channel in the shared [`PendingRegistry`]
//! 2. The notifier sends a message tagged with the id
//! 3. The session races the channel against its deadline
//! 4. Whichever fires first fixes the [`Outcome`]; the registry entry is
//!    removed on every exit path
//! 5. Resolver calls for an id that is no longer registered observe
//!    [`Resolution::NotFound`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use assent_approval::{
//!     CorrelationId, Decision, DecisionAction, Delivery, PendingRegistry, decision_channel,
//! };
//!
//! let registry = Arc::new(PendingRegistry::new());
//! let id = CorrelationId::new();
//! let (tx, _rx) = decision_channel();
//! registry.register(id.clone(), tx);
//!
//! let decision = Decision::new(DecisionAction::Approve, "alice");
//! assert_eq!(registry.resolve(&id, decision.clone()), Delivery::Delivered);
//! assert_eq!(registry.resolve(&id, decision), Delivery::NotFound);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod broker;
pub mod channel;
pub mod correlation;
pub mod decision;
/// Error types and results for the approval engine.
pub mod error;
pub mod notifier;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod timeout;

pub use broker::ApprovalBroker;
pub use channel::{DecisionReceiver, DecisionSender, decision_channel};
pub use correlation::CorrelationId;
pub use decision::{Decision, DecisionAction, Outcome};
pub use error::{ApprovalError, ApprovalResult, ResolveError};
pub use notifier::{
    ActionStyle, MessageHandle, NotificationRequest, Notifier, NotifierError, OfferedAction,
};
pub use registry::{Delivery, PendingRegistry};
pub use resolver::{DecisionResolver, Resolution, Submission};
pub use session::{ApprovalSession, SessionReport};
pub use timeout::TimeoutPolicy;
