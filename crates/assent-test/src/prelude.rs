//! Prelude module - commonly used test helpers.

pub use crate::{
    MockNotifier, NotifierCall, TEST_CHANNEL, TEST_VERIFICATION_TOKEN, init_test_logging,
    test_submission,
};
