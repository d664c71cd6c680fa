//! Error types for the Qiskit Runtime adapter.

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur while reading backend snapshots.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Backend is not among the loaded snapshots.
    #[error("Unknown IBM backend: {0}")]
    UnknownBackend(String),

    /// The workload cannot be priced on a backend.
    #[error("Backend '{backend}' cannot price a {workload} workload")]
    UnpricedWorkload {
        /// Backend name.
        backend: String,
        /// Workload kind.
        workload: &'static str,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<IbmError> for qpolicy_hal::HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::UnknownBackend(name) => qpolicy_hal::HalError::DeviceNotFound(name),
            IbmError::JsonError(err) => qpolicy_hal::HalError::Serialization(err),
            IbmError::UnpricedWorkload { .. } => qpolicy_hal::HalError::Provider(e.to_string()),
        }
    }
}
