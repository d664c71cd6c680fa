//! Engine configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QPOLICY_ prefix)
//! 3. .env files
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::selector::SelectionStrategy;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Pricing constants
    #[serde(default)]
    pub cost: CostConfig,

    /// Availability normalization
    #[serde(default)]
    pub availability: AvailabilityConfig,

    /// Runtime comparison
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pricing constants in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Flat fee per quantum task submission
    #[serde(default = "default_task_fee")]
    pub task_fee: f64,

    /// Classical compute cost of a hybrid job per second
    #[serde(default = "default_classical_rate")]
    pub classical_rate_per_second: f64,

    /// Qiskit Runtime premium plan cost per second
    #[serde(default = "default_qiskit_rate")]
    pub qiskit_rate_per_second: f64,
}

/// Availability normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Device name fragments identifying always-available simulators
    #[serde(default = "default_simulator_patterns")]
    pub simulator_patterns: Vec<String>,

    /// Availability reported for simulators, in hours
    #[serde(default = "default_simulator_hours")]
    pub simulator_hours: f64,
}

/// Runtime comparison settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Strategy for multi-policy evaluations. Derived from the active
    /// policies when unset.
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_task_fee() -> f64 {
    0.30
}

fn default_classical_rate() -> f64 {
    0.00443
}

fn default_qiskit_rate() -> f64 {
    1.6
}

fn default_simulator_patterns() -> Vec<String> {
    vec!["SV1".to_string(), "TN1".to_string(), "dm1".to_string()]
}

fn default_simulator_hours() -> f64 {
    168.0 // one week
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for CostConfig {
    fn default() -> Self {
        CostConfig {
            task_fee: default_task_fee(),
            classical_rate_per_second: default_classical_rate(),
            qiskit_rate_per_second: default_qiskit_rate(),
        }
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        AvailabilityConfig {
            simulator_patterns: default_simulator_patterns(),
            simulator_hours: default_simulator_hours(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: EngineConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Self {
        EngineConfig::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Load .env file if it exists
    /// 2. Load from file if provided
    /// 3. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => EngineConfig::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup. Variables that are absent or
    /// fail to parse leave the corresponding fields unchanged.
    pub fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Cost
        if let Some(val) = var("QPOLICY_TASK_FEE").and_then(|v| v.parse().ok()) {
            self.cost.task_fee = val;
        }
        if let Some(val) = var("QPOLICY_CLASSICAL_RATE").and_then(|v| v.parse().ok()) {
            self.cost.classical_rate_per_second = val;
        }
        if let Some(val) = var("QPOLICY_QISKIT_RATE").and_then(|v| v.parse().ok()) {
            self.cost.qiskit_rate_per_second = val;
        }

        // Availability
        if let Some(v) = var("QPOLICY_SIMULATOR_PATTERNS") {
            self.availability.simulator_patterns = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(val) = var("QPOLICY_SIMULATOR_HOURS").and_then(|v| v.parse().ok()) {
            self.availability.simulator_hours = val;
        }

        // Selection
        if let Some(strategy) = var("QPOLICY_STRATEGY").and_then(|v| v.parse().ok()) {
            self.selection.strategy = Some(strategy);
        }

        // Logging
        if let Some(v) = var("QPOLICY_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("QPOLICY_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("task_fee", self.cost.task_fee),
            ("classical_rate_per_second", self.cost.classical_rate_per_second),
            ("qiskit_rate_per_second", self.cost.qiskit_rate_per_second),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.availability.simulator_hours.is_finite() || self.availability.simulator_hours < 0.0
        {
            return Err(ConfigError::ValidationError(format!(
                "simulator_hours must be a non-negative number, got {}",
                self.availability.simulator_hours
            )));
        }

        if self
            .availability
            .simulator_patterns
            .iter()
            .any(|p| p.is_empty())
        {
            return Err(ConfigError::ValidationError(
                "simulator_patterns must not contain empty patterns".to_string(),
            ));
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.cost.task_fee, 0.30);
        assert_eq!(config.cost.classical_rate_per_second, 0.00443);
        assert_eq!(config.cost.qiskit_rate_per_second, 1.6);
        assert_eq!(config.availability.simulator_hours, 168.0);
        assert_eq!(config.availability.simulator_patterns, vec!["SV1", "TN1", "dm1"]);
        assert!(config.selection.strategy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml_ng::from_str(
            "cost:\n  task_fee: 0.5\nselection:\n  strategy: lower_wins\n",
        )
        .unwrap();
        assert_eq!(config.cost.task_fee, 0.5);
        assert_eq!(config.cost.classical_rate_per_second, 0.00443);
        assert_eq!(config.selection.strategy, Some(SelectionStrategy::LowerWins));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qpolicy.yaml");
        std::fs::write(&path, "availability:\n  simulator_hours: 24\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.availability.simulator_hours, 24.0);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qpolicy.yaml");
        std::fs::write(&path, "logging:\n  level: loud\n").unwrap();

        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("QPOLICY_TASK_FEE", "0.25"),
            ("QPOLICY_SIMULATOR_PATTERNS", "SV1, sim_"),
            ("QPOLICY_STRATEGY", "higher_wins"),
            ("QPOLICY_SIMULATOR_HOURS", "not-a-number"),
            ("QPOLICY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default().merge_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.cost.task_fee, 0.25);
        assert_eq!(config.availability.simulator_patterns, vec!["SV1", "sim_"]);
        assert_eq!(config.availability.simulator_hours, 168.0);
        assert_eq!(config.selection.strategy, Some(SelectionStrategy::HigherWins));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validate_negative_fee() {
        let mut config = EngineConfig::default();
        config.cost.task_fee = -1.0;
        assert!(config.validate().is_err());
    }
}
