use crate::notifier::NotifierError;

/// Errors that can occur while starting or running an approval session.
///
/// Correlation invariants (single delivery, unconditional deregistration)
/// are never surfaced here; only caller input and notifier failures are.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The requested deadline is malformed or outside the configured range.
    #[error("invalid timeout '{value}': {reason}")]
    InvalidTimeout {
        /// The raw value supplied by the caller.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The outbound notifier failed before the session could start waiting.
    #[error("notifier error: {0}")]
    Notifier(#[from] NotifierError),
}

/// Result type for approval session operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

/// Rejections produced by the decision resolver before touching the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The callback's shared token did not match the verification token.
    #[error("callback token mismatch")]
    Unauthorized,

    /// The callback carried an action other than approve or cancel.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
}
