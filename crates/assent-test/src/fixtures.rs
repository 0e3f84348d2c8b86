//! Test fixtures for common types.

use assent_approval::{CorrelationId, Submission};

/// Verification token used by test brokers and callbacks.
pub const TEST_VERIFICATION_TOKEN: &str = "test-verification-token";

/// Channel used by test approval requests.
pub const TEST_CHANNEL: &str = "#deploys";

/// Build a correctly authenticated submission.
#[must_use]
pub fn test_submission(
    correlation_id: &CorrelationId,
    action: impl Into<String>,
    actor: impl Into<String>,
) -> Submission {
    Submission {
        correlation_id: correlation_id.clone(),
        action: action.into(),
        actor: actor.into(),
        token: TEST_VERIFICATION_TOKEN.to_string(),
    }
}

/// Route `tracing` output through the test harness writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
