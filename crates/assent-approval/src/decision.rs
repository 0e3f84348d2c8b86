//! Decisions delivered by callbacks and the outcomes they produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ResolveError;

/// The action a human chose on the messaging surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    /// Let the request proceed.
    Approve,
    /// Refuse the request.
    Cancel,
}

impl DecisionAction {
    /// Wire name used for the interactive button.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Cancel => "cancel",
        }
    }

    /// Whether this action approves the request.
    #[must_use]
    pub fn is_approve(self) -> bool {
        matches!(self, Self::Approve)
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionAction {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "cancel" => Ok(Self::Cancel),
            other => Err(ResolveError::UnsupportedAction(other.to_owned())),
        }
    }
}

/// A single decision travelling through a decision channel.
///
/// The actor is attribution only; it never influences correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// What was chosen.
    pub action: DecisionAction,
    /// Who chose it (messaging-surface user name).
    pub actor: String,
}

impl Decision {
    /// Create a new decision.
    #[must_use]
    pub fn new(action: DecisionAction, actor: impl Into<String>) -> Self {
        Self {
            action,
            actor: actor.into(),
        }
    }

    /// Check if this decision approves the request.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.action.is_approve()
    }
}

/// Terminal state of an approval session. Produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    /// A human approved before the deadline.
    Approved {
        /// Who approved.
        actor: String,
    },
    /// A human canceled before the deadline.
    Canceled {
        /// Who canceled.
        actor: String,
    },
    /// The deadline elapsed first.
    Expired,
}

impl Outcome {
    /// Short lowercase label (`approved`, `canceled`, `expired`).
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved { .. } => "approved",
            Self::Canceled { .. } => "canceled",
            Self::Expired => "expired",
        }
    }

    /// Check if this outcome lets the request proceed.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// The deciding actor, if a human decided.
    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        match self {
            Self::Approved { actor } | Self::Canceled { actor } => Some(actor),
            Self::Expired => None,
        }
    }
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision.action {
            DecisionAction::Approve => Self::Approved {
                actor: decision.actor,
            },
            DecisionAction::Cancel => Self::Canceled {
                actor: decision.actor,
            },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved { actor } => write!(f, "approved by {actor}"),
            Self::Canceled { actor } => write!(f, "canceled by {actor}"),
            Self::Expired => f.write_str("expired"),
        }
    }
}
