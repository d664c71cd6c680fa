//! Error handling for the decision engine.
//!
//! Every failure is surfaced to the caller as a [`Failure`] carrying an
//! [`ErrorKind`] and a message, never as an empty or zero result.

use qpolicy_analysis::AnalysisError;
use qpolicy_hal::HalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for engine operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur during an evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolicyError {
    /// An active policy has no metric for a device.
    #[error("Policy '{policy}' is active but {runtime} device '{device}' has no {policy} metric")]
    MissingSignal {
        policy: String,
        runtime: String,
        device: String,
    },

    /// The cost estimate depends on a shot count only known at runtime.
    #[error("Cost estimate rejected: {0}")]
    AmbiguousShotCount(String),

    /// No eligible device is left to rank.
    #[error("No eligible devices for {runtime}")]
    EmptyCandidateSet { runtime: String },

    /// The policy configuration cannot be interpreted.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// A metric provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] HalError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<AnalysisError> for PolicyError {
    fn from(err: AnalysisError) -> Self {
        if matches!(err, AnalysisError::AmbiguousShotCount { .. }) {
            PolicyError::AmbiguousShotCount(err.to_string())
        } else {
            PolicyError::InvalidPolicy(format!("program analysis failed: {err}"))
        }
    }
}

impl From<ConfigError> for PolicyError {
    fn from(err: ConfigError) -> Self {
        PolicyError::Configuration(err.to_string())
    }
}

/// Failure classes reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MissingSignal,
    AmbiguousShotCount,
    EmptyCandidateSet,
    InvalidPolicy,
    Provider,
    Configuration,
}

/// Structured failure: kind plus human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::MissingSignal { .. } => ErrorKind::MissingSignal,
            PolicyError::AmbiguousShotCount(_) => ErrorKind::AmbiguousShotCount,
            PolicyError::EmptyCandidateSet { .. } => ErrorKind::EmptyCandidateSet,
            PolicyError::InvalidPolicy(_) => ErrorKind::InvalidPolicy,
            PolicyError::Provider(_) => ErrorKind::Provider,
            PolicyError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
