//! Operation outcomes
//!
//! Every executed operation resolves to exactly one [`Outcome`]. Nothing
//! escapes an operation as a panic or an `Err`.

use crate::error::TransportError;
use std::fmt;

/// Result of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Status matched the operation's success code and any follow-up
    /// reconciliation was applied
    Succeeded { status: u16 },

    /// Status did not match the success code
    Rejected { status: u16, body: String },

    /// Status matched but the body could not be reconciled
    Malformed { status: u16, reason: String },

    /// No response at all
    TransportFailed(TransportError),

    /// Precondition not met; no request was issued
    Skipped { reason: &'static str },
}

impl Outcome {
    /// Coarse classification for tallies
    #[must_use]
    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Succeeded { .. } => OutcomeClass::Succeeded,
            Outcome::Rejected { .. } => OutcomeClass::Rejected,
            Outcome::Malformed { .. } => OutcomeClass::Malformed,
            Outcome::TransportFailed(_) => OutcomeClass::TransportFailed,
            Outcome::Skipped { .. } => OutcomeClass::Skipped,
        }
    }

    /// Status code, when a response was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Succeeded { status }
            | Outcome::Rejected { status, .. }
            | Outcome::Malformed { status, .. } => Some(*status),
            Outcome::TransportFailed(_) | Outcome::Skipped { .. } => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded { status } => write!(f, "succeeded ({status})"),
            Outcome::Rejected { status, body } => write!(f, "rejected ({status}): {body}"),
            Outcome::Malformed { status, reason } => write!(f, "malformed ({status}): {reason}"),
            Outcome::TransportFailed(e) => write!(f, "{e}"),
            Outcome::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Outcome without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeClass {
    Succeeded,
    Rejected,
    Malformed,
    TransportFailed,
    Skipped,
}
