//! Deadline policy for approval sessions.

use std::time::Duration;

use crate::error::{ApprovalError, ApprovalResult};

/// Default deadline when the caller does not supply one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Hard ceiling on caller-supplied deadlines.
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Bounds applied to caller-supplied deadlines, in whole seconds.
///
/// Values are validated before a session starts; a rejected value never
/// reaches the registry or the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    default_secs: u64,
    min_secs: u64,
    max_secs: u64,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            default_secs: DEFAULT_TIMEOUT_SECS,
            min_secs: 0,
            max_secs: MAX_TIMEOUT_SECS,
        }
    }
}

impl TimeoutPolicy {
    /// Create a policy with explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidTimeout`] unless
    /// `min_secs <= default_secs <= max_secs`.
    pub fn new(default_secs: u64, min_secs: u64, max_secs: u64) -> ApprovalResult<Self> {
        if min_secs > max_secs || !(min_secs..=max_secs).contains(&default_secs) {
            return Err(ApprovalError::InvalidTimeout {
                value: default_secs.to_string(),
                reason: format!("default must lie within [{min_secs}, {max_secs}] seconds"),
            });
        }
        Ok(Self {
            default_secs,
            min_secs,
            max_secs,
        })
    }

    /// Deadline used when the caller omits one.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_secs)
    }

    /// Largest accepted deadline.
    #[must_use]
    pub fn max_timeout(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }

    /// Parse a raw deadline as received from a request form.
    ///
    /// `None` or an empty (whitespace-only) string selects the default.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidTimeout`] for non-integer or
    /// out-of-range values.
    pub fn parse(&self, raw: Option<&str>) -> ApprovalResult<Duration> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(self.default_timeout());
        };

        let secs: i64 = raw.parse().map_err(|_| ApprovalError::InvalidTimeout {
            value: raw.to_owned(),
            reason: "not an integer number of seconds".to_owned(),
        })?;

        let secs = u64::try_from(secs).map_err(|_| ApprovalError::InvalidTimeout {
            value: raw.to_owned(),
            reason: "must not be negative".to_owned(),
        })?;

        self.check(secs)
    }

    /// Validate a deadline already expressed in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidTimeout`] if `secs` is out of range.
    pub fn check(&self, secs: u64) -> ApprovalResult<Duration> {
        if secs < self.min_secs {
            return Err(ApprovalError::InvalidTimeout {
                value: secs.to_string(),
                reason: format!("below minimum of {} seconds", self.min_secs),
            });
        }
        if secs > self.max_secs {
            return Err(ApprovalError::InvalidTimeout {
                value: secs.to_string(),
                reason: format!("exceeds maximum of {} seconds", self.max_secs),
            });
        }
        Ok(Duration::from_secs(secs))
    }
}
