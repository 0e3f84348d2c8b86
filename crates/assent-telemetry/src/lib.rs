//! Assent Telemetry - Logging setup for the Assent approval broker.
//!
//! # Example
//!
//! ```rust,no_run
//! use assent_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), assent_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Json)
//!     .with_directive("assent_slack=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!(correlation_id = "3f2b", "approval request posted");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
