//! Prelude module - commonly used types for convenient import.
//!
//! Use `use assent_approval::prelude::*;` to import the essential types.

// Engine
pub use crate::{ApprovalBroker, ApprovalSession, DecisionResolver, PendingRegistry};

// Data model
pub use crate::{CorrelationId, Decision, DecisionAction, Outcome, SessionReport};

// Callback path
pub use crate::{Resolution, Submission};

// Notifier seam
pub use crate::{MessageHandle, NotificationRequest, Notifier, NotifierError};

// Errors
pub use crate::{ApprovalError, ApprovalResult, ResolveError};

// Policy
pub use crate::TimeoutPolicy;
