//! Error types for program analysis.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while estimating shot counts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// A shot argument is not a literal and can only be known at runtime.
    #[error("Shot count of `{call}` at line {line} cannot be resolved statically: {expression}")]
    AmbiguousShotCount {
        /// Recognized call, e.g. `device.run`.
        call: String,
        /// 1-based source line of the call.
        line: usize,
        /// Source text of the unresolved argument.
        expression: String,
    },

    /// Summed shot or task counts exceed the counter range.
    #[error("Shot count overflow: the summed submissions exceed {max}", max = u64::MAX)]
    ShotCountOverflow,

    /// Reading a program or bundle failed.
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The bundle root is not a directory.
    #[error("Program bundle not found: {0}")]
    BundleNotFound(PathBuf),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        AnalysisError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_display() {
        let err = AnalysisError::AmbiguousShotCount {
            call: "device.run".into(),
            line: 12,
            expression: "n_shots".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("device.run"));
        assert!(msg.contains("line 12"));
        assert!(msg.contains("n_shots"));
    }

    #[test]
    fn test_bundle_not_found_display() {
        let err = AnalysisError::BundleNotFound(PathBuf::from("/tmp/missing"));
        assert_eq!(err.to_string(), "Program bundle not found: /tmp/missing");
    }
}
