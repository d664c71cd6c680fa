//! Error types for the Braket adapter.

use thiserror::Error;

/// Result type for Braket operations.
pub type BraketResult<T> = Result<T, BraketError>;

/// Errors that can occur while reading Braket device documents.
#[derive(Debug, Error)]
pub enum BraketError {
    /// Device is not among the loaded documents.
    #[error("Unknown Braket device: {0}")]
    UnknownDevice(String),

    /// A priced device document carries no unit price.
    #[error("Device '{0}' has a price rule but its document has no deviceCost")]
    MissingPrice(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<BraketError> for qpolicy_hal::HalError {
    fn from(e: BraketError) -> Self {
        match e {
            BraketError::UnknownDevice(id) => qpolicy_hal::HalError::DeviceNotFound(id),
            BraketError::JsonError(err) => qpolicy_hal::HalError::Serialization(err),
            BraketError::MissingPrice(_) => qpolicy_hal::HalError::Configuration(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_price_display() {
        let err = BraketError::MissingPrice("Lucy".into());
        assert!(err.to_string().contains("Lucy"));
        assert!(err.to_string().contains("deviceCost"));
    }

    #[test]
    fn test_unknown_device_to_hal() {
        let hal: qpolicy_hal::HalError = BraketError::UnknownDevice("arn:x".into()).into();
        assert!(matches!(hal, qpolicy_hal::HalError::DeviceNotFound(id) if id == "arn:x"));
    }

    #[test]
    fn test_json_error_to_hal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let hal: qpolicy_hal::HalError = BraketError::from(json_err).into();
        assert!(matches!(hal, qpolicy_hal::HalError::Serialization(_)));
    }

    #[test]
    fn test_missing_price_to_hal_configuration() {
        let hal: qpolicy_hal::HalError = BraketError::MissingPrice("IonQ".into()).into();
        assert!(matches!(hal, qpolicy_hal::HalError::Configuration(msg) if msg.contains("IonQ")));
    }
}
