//! Assent Test - Shared test utilities for the Assent approval broker.
//!
//! This crate provides a recording [`MockNotifier`] and fixtures that can be
//! used across the Assent crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! assent-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use assent_approval::{ApprovalBroker, TimeoutPolicy};
//! use assent_test::{MockNotifier, TEST_VERIFICATION_TOKEN};
//!
//! #[tokio::test]
//! async fn posts_one_message() {
//!     let notifier = Arc::new(MockNotifier::new());
//!     let broker = ApprovalBroker::new(
//!         notifier.clone(),
//!         TEST_VERIFICATION_TOKEN,
//!         TimeoutPolicy::default(),
//!     );
//!     let report = broker.start_approval("#ops", "deploy?", Some("0")).await.unwrap();
//!     assert_eq!(notifier.sent().len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
