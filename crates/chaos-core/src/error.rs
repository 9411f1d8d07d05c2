//! Error types for the chaos core
//!
//! - [`TransportError`]: a request never produced a response
//! - [`ConfigError`]: the run cannot start with the given settings
//! - [`StateMachineError`]: the run loop attempted an illegal transition
//!
//! Neither an unexpected status code nor an empty registry is an error; both
//! are expressed as an [`Outcome`](crate::outcome::Outcome).

use crate::state_machine::RunState;
use std::time::Duration;

/// A request did not yield a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS, TLS)
    #[error("connection failed: {0}")]
    Connect(String),

    /// No response before the configured deadline
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Response arrived but its body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Anything else the transport reports
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Check whether the failure was a deadline expiry
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Run loop state machine misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    #[error("illegal run state transition {from:?} -> {to:?}")]
    IllegalTransition { from: RunState, to: RunState },
}

/// Invalid run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Valid-bias ratio outside `[0, 1]`
    #[error("valid ratio must be within [0, 1], got {0}")]
    InvalidRatio(f64),

    /// Pacing range is inverted
    #[error("min delay {min_ms}ms exceeds max delay {max_ms}ms")]
    InvertedDelay { min_ms: u64, max_ms: u64 },

    /// Progress interval of zero
    #[error("report interval must be at least 1")]
    ZeroReportInterval,

    /// Base URL unusable
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Collection name unusable as a path segment
    #[error("invalid collection name `{0}`")]
    InvalidCollection(String),

    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`ChaosConfig`](crate::config::ChaosConfig)
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
