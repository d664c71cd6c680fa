//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur while gathering device metrics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No provider registered for a runtime.
    #[error("No provider registered for runtime {0}")]
    UnknownRuntime(String),

    /// Device not known to its provider.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Malformed execution window.
    #[error("Invalid execution window: {0}")]
    InvalidWindow(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic provider error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
